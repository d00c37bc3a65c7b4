use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::parse::{Parse, ParseStream};
use syn::{bracketed, parenthesized, Attribute, Ident, ItemStruct, Path, Token, Type};

/// The three lists a `#[module(...)]` attribute accepts
#[derive(Clone, Copy, PartialEq)]
enum Section {
    Imports,
    Providers,
    Bindings,
}

impl Section {
    fn from_ident(ident: &Ident) -> syn::Result<Self> {
        match ident.to_string().as_str() {
            "imports" => Ok(Section::Imports),
            "providers" => Ok(Section::Providers),
            "bindings" => Ok(Section::Bindings),
            other => Err(syn::Error::new(
                ident.span(),
                format!(
                    "unknown module key `{}`, expected `imports`, `providers` or `bindings`",
                    other
                ),
            )),
        }
    }
}

/// A module or provider type, with any `#[cfg]`-style attributes in front of it
struct Entry {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Entry {
            attrs: input.call(Attribute::parse_outer)?,
            path: input.parse()?,
        })
    }
}

/// `(dyn Trait => Impl)`: serve `Arc<dyn Trait>` from the `Impl` provider
struct Binding {
    interface: Type,
    implementation: Path,
}

impl Parse for Binding {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        parenthesized!(content in input);

        let interface: Type = content.parse()?;
        if !matches!(&interface, Type::TraitObject(object) if object.dyn_token.is_some()) {
            return Err(syn::Error::new_spanned(
                &interface,
                "a binding maps a trait object to its implementation: `(dyn Trait => Impl)`",
            ));
        }
        content.parse::<Token![=>]>()?;

        Ok(Binding {
            interface,
            implementation: content.parse()?,
        })
    }
}

impl Binding {
    fn cast(&self) -> TokenStream2 {
        let interface = &self.interface;
        let implementation = &self.implementation;
        quote! {
            .bind(|i: ::std::sync::Arc<#implementation>| i as ::std::sync::Arc<#interface>)
        }
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.to_token_stream().to_string() == b.to_token_stream().to_string()
}

#[derive(Default)]
struct ModuleDefinition {
    imports: Vec<Entry>,
    providers: Vec<Entry>,
    bindings: Vec<Binding>,
}

impl Parse for ModuleDefinition {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut definition = ModuleDefinition::default();
        let mut seen = Vec::new();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let section = Section::from_ident(&key)?;
            if seen.contains(&section) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("module key `{}` given more than once", key),
                ));
            }
            seen.push(section);

            input.parse::<Token![=]>()?;
            let list;
            bracketed!(list in input);

            match section {
                Section::Imports => {
                    definition.imports = list
                        .parse_terminated(Entry::parse, Token![,])?
                        .into_iter()
                        .collect()
                }
                Section::Providers => {
                    definition.providers = list
                        .parse_terminated(Entry::parse, Token![,])?
                        .into_iter()
                        .collect()
                }
                Section::Bindings => {
                    definition.bindings = list
                        .parse_terminated(Binding::parse, Token![,])?
                        .into_iter()
                        .collect()
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        definition.reject_repeated_providers()?;
        Ok(definition)
    }
}

impl ModuleDefinition {
    /// A provider listed twice would register two unnamed providers of one type
    fn reject_repeated_providers(&self) -> syn::Result<()> {
        for (index, entry) in self.providers.iter().enumerate() {
            if self.providers[..index]
                .iter()
                .any(|earlier| same_path(&earlier.path, &entry.path))
            {
                return Err(syn::Error::new_spanned(
                    &entry.path,
                    "provider listed more than once",
                ));
            }
        }
        Ok(())
    }

    fn is_provider(&self, path: &Path) -> bool {
        self.providers.iter().any(|entry| same_path(&entry.path, path))
    }

    // Imported modules go through `install`, so shared imports register once
    fn import_calls(&self) -> impl Iterator<Item = TokenStream2> + '_ {
        self.imports.iter().map(move |Entry { attrs, path }| {
            quote! {
                #(#attrs)*
                container.install::<#path>()?;
            }
        })
    }

    // A provider's bindings ride on its own registration so every slot shares one instance
    fn provider_calls(&self) -> impl Iterator<Item = TokenStream2> + '_ {
        self.providers.iter().map(move |Entry { attrs, path }| {
            let casts = self
                .bindings
                .iter()
                .filter(|binding| same_path(&binding.implementation, path))
                .map(Binding::cast);
            quote! {
                #(#attrs)*
                <#path as ::wireup::Injectable>::provide(container)
                    #(#casts)*
                    .register()?;
            }
        })
    }

    // Implementations bound here but not listed as providers get one registration each
    fn unlisted_binding_calls(&self) -> Vec<TokenStream2> {
        let mut groups: Vec<(&Path, Vec<&Binding>)> = Vec::new();
        for binding in self
            .bindings
            .iter()
            .filter(|binding| !self.is_provider(&binding.implementation))
        {
            match groups
                .iter_mut()
                .find(|(path, _)| same_path(path, &binding.implementation))
            {
                Some((_, group)) => group.push(binding),
                None => groups.push((&binding.implementation, vec![binding])),
            }
        }

        groups
            .into_iter()
            .map(|(path, group)| {
                let casts = group.into_iter().map(Binding::cast);
                quote! {
                    <#path as ::wireup::Injectable>::provide(container)
                        #(#casts)*
                        .register()?;
                }
            })
            .collect()
    }

    fn expand(&self, item: &ItemStruct) -> TokenStream2 {
        let module = &item.ident;
        let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
        let imports = self.import_calls();
        let providers = self.provider_calls();
        let unlisted = self.unlisted_binding_calls();

        quote! {
            #item

            impl #impl_generics ::wireup::Module for #module #ty_generics #where_clause {
                fn register(container: &::wireup::Container) -> ::wireup::Result<()> {
                    #(#imports)*
                    #(#providers)*
                    #(#unlisted)*
                    Ok(())
                }
            }

            impl #impl_generics #module #ty_generics #where_clause {
                /// Create a new container with this module installed
                pub fn create_container() -> ::wireup::Result<::wireup::Container> {
                    let container = ::wireup::Container::new();
                    container.install::<Self>()?;
                    Ok(container)
                }
            }
        }
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let definition = syn::parse_macro_input!(attr as ModuleDefinition);
    let item = syn::parse_macro_input!(item as ItemStruct);
    definition.expand(&item).into()
}
