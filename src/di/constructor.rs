//! Constructor and callable plumbing.
//!
//! Rust has no runtime reflection over function signatures, so the ordered
//! parameter types of a constructor are captured by [`Injected`], which is
//! implemented for every `Fn(A1, .., An) -> R` whose parameters are
//! [`Dependency`] types.

use crate::di::{Component, Dependency, TypeKey, Value};
use anyhow::anyhow;
use std::sync::Arc;

/// Describes one constructor parameter.
#[derive(Clone, Copy)]
pub struct ParamSpec {
    key: TypeKey,
    nullable: bool,
    accepts: fn(&Value) -> bool,
}

impl ParamSpec {
    pub fn of<D: Dependency>() -> Self {
        Self {
            key: D::key(),
            nullable: D::absent().is_some(),
            accepts: accepts::<D>,
        }
    }

    /// Key under which a provider for this parameter is looked up.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Whether the parameter has an absent value and may be marked optional.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether a literal value can be passed for this parameter.
    pub fn accepts(&self, value: &Value) -> bool {
        (self.accepts)(value)
    }
}

impl std::fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSpec")
            .field("key", &self.key)
            .field("nullable", &self.nullable)
            .finish()
    }
}

fn accepts<D: Dependency>(value: &Value) -> bool {
    D::from_value(value).is_some()
}

/// A callable whose parameters can be supplied by the container.
///
/// `None` in the argument list stands for "absent" and is turned into the
/// parameter's [`Dependency::absent`] value.
pub trait Injected<Args> {
    type Output;

    fn params() -> Vec<ParamSpec>;

    fn invoke(&self, args: Vec<Option<Value>>) -> anyhow::Result<Self::Output>;
}

/// Marker for constructors returning a component directly.
pub struct Plain;

/// Marker for constructors returning `Result<component, error>`.
pub struct Fallible;

/// Turns a constructor's return value into the component it provides.
pub trait IntoProduct<Marker> {
    type Component: Component;

    fn into_product(self) -> anyhow::Result<Self::Component>;
}

impl<C: Component> IntoProduct<Plain> for C {
    type Component = C;

    fn into_product(self) -> anyhow::Result<C> {
        Ok(self)
    }
}

impl<C, E> IntoProduct<Fallible> for Result<C, E>
where
    C: Component,
    E: Into<anyhow::Error>,
{
    type Component = C;

    fn into_product(self) -> anyhow::Result<C> {
        self.map_err(Into::into)
    }
}

fn take_arg<D: Dependency>(slot: Option<(usize, Option<Value>)>) -> anyhow::Result<D> {
    let (position, value) = slot.ok_or_else(|| anyhow!("too few arguments supplied"))?;
    match value {
        Some(value) => D::from_value(&value).ok_or_else(|| {
            anyhow!(
                "argument {} is not a {}",
                position,
                std::any::type_name::<D>()
            )
        }),
        None => D::absent().ok_or_else(|| {
            anyhow!(
                "argument {} ({}) has no absent value",
                position,
                std::any::type_name::<D>()
            )
        }),
    }
}

macro_rules! impl_injected {
    ($($param:ident),*) => {
        impl<Func, Out, $($param,)*> Injected<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Out,
            $($param: Dependency,)*
        {
            type Output = Out;

            fn params() -> Vec<ParamSpec> {
                vec![$(ParamSpec::of::<$param>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, args: Vec<Option<Value>>) -> anyhow::Result<Out> {
                let mut args = args.into_iter().enumerate();
                $(
                    let $param = take_arg::<$param>(args.next())?;
                )*
                Ok((self)($($param),*))
            }
        }
    };
}

impl_injected!();
impl_injected!(A1);
impl_injected!(A1, A2);
impl_injected!(A1, A2, A3);
impl_injected!(A1, A2, A3, A4);
impl_injected!(A1, A2, A3, A4, A5);
impl_injected!(A1, A2, A3, A4, A5, A6);
impl_injected!(A1, A2, A3, A4, A5, A6, A7);
impl_injected!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_injected!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_injected!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_injected!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_injected!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

type InvokeFn = dyn Fn(Vec<Option<Value>>) -> anyhow::Result<Value> + Send + Sync;

/// A registered constructor with its parameter list, erased to values.
#[derive(Clone)]
pub(crate) struct ErasedConstructor {
    params: Vec<ParamSpec>,
    invoke: Arc<InvokeFn>,
}

impl ErasedConstructor {
    pub(crate) fn new<F, Args, M>(constructor: F) -> Self
    where
        F: Injected<Args> + Send + Sync + 'static,
        F::Output: IntoProduct<M>,
        Args: 'static,
        M: 'static,
    {
        Self {
            params: F::params(),
            invoke: Arc::new(move |args| {
                let product = constructor.invoke(args)?.into_product()?;
                Ok(product.into_value())
            }),
        }
    }

    pub(crate) fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn invoke(&self, args: Vec<Option<Value>>) -> anyhow::Result<Value> {
        (self.invoke)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: u32, b: u32) -> u32 {
        a + b
    }

    #[test]
    fn test_params_follow_declaration_order() {
        let params = <fn(String, Option<Arc<u8>>) -> u32 as Injected<_>>::params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].key(), TypeKey::of::<String>());
        assert_eq!(params[1].key(), TypeKey::of::<Arc<u8>>());
        assert!(params[1].is_nullable());
    }

    #[test]
    fn test_invoke_with_values_and_absent() {
        let args = vec![Some(2u32.into_value()), None];
        assert_eq!(add.invoke(args).unwrap(), 2);
    }

    #[test]
    fn test_invoke_rejects_mismatched_argument() {
        let args = vec![Some("two".to_string().into_value()), Some(3u32.into_value())];
        let err = add.invoke(args).unwrap_err();
        assert!(err.to_string().contains("argument 0"));
    }

    #[test]
    fn test_erased_fallible_constructor() {
        let ok = ErasedConstructor::new(|n: u32| -> Result<String, std::fmt::Error> {
            Ok(n.to_string())
        });
        let value = ok.invoke(vec![Some(5u32.into_value())]).unwrap();
        assert_eq!(String::from_value(&value).as_deref(), Some("5"));

        let failing =
            ErasedConstructor::new(|| -> Result<String, std::fmt::Error> { Err(std::fmt::Error) });
        assert!(failing.invoke(Vec::new()).is_err());
    }
}
