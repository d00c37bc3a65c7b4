use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput, Generics, Ident, Type};

/// Constructors take at most this many parameters.
const MAX_FIELDS: usize = 12;

#[derive(FromDeriveInput)]
#[darling(attributes(inject), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: Generics,
    data: ast::Data<(), InjectField>,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    default: bool,
    #[darling(default)]
    transient: bool,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    optional: bool,
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match InjectableInput::from_derive_input(&input) {
        Ok(parsed) => generate_injectable_impl(&parsed).unwrap_or_else(syn::Error::into_compile_error),
        Err(err) => err.write_errors(),
    };
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &InjectableInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        ast::Data::Struct(fields) => &fields.fields,
        ast::Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    if fields.len() > MAX_FIELDS {
        return Err(syn::Error::new_spanned(
            struct_name,
            format!(
                "#[derive(Injectable)] supports at most {} fields, found {}",
                MAX_FIELDS,
                fields.len()
            ),
        ));
    }

    // One closure parameter per field, in declaration order
    let args: Vec<Ident> = (0..fields.len()).map(|i| format_ident!("__arg{}", i)).collect();
    let params = fields.iter().zip(&args).map(|(field, arg)| {
        let ty = &field.ty;
        quote!(#arg: #ty)
    });
    let inits = fields.iter().zip(&args).map(|(field, arg)| {
        let field_name = &field.ident;
        quote!(#field_name: #arg)
    });

    let depends_on = fields.iter().enumerate().filter_map(|(position, field)| {
        field
            .name
            .as_ref()
            .map(|name| quote!(.depends_on(#position, #name)))
    });

    let optional: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.optional)
        .map(|(position, _)| position)
        .collect();
    let optional = (!optional.is_empty()).then(|| quote!(.optional([#(#optional),*])));

    let named = input.name.as_ref().map(|name| quote!(.named(#name)));
    let as_default = input.default.then(|| quote!(.as_default()));
    let transient = input.transient.then(|| quote!(.transient()));

    Ok(quote! {
        impl #impl_generics ::wireup::Injectable for #struct_name #ty_generics #where_clause {
            fn provide(
                container: &::wireup::Container
            ) -> ::wireup::ProviderBuilder<'_, ::std::sync::Arc<Self>> {
                container
                    .provide(|#(#params),*| ::std::sync::Arc::new(Self { #(#inits),* }))
                    #(#depends_on)*
                    #optional
                    #named
                    #as_default
                    #transient
            }
        }
    })
}
