use crate::di::{TypeKey, Value};
use std::sync::Arc;

/// A type that can appear as a constructor parameter.
///
/// Providers are looked up under [`Dependency::key`]; the built value is then
/// recovered with [`Dependency::from_value`]. Parameters marked optional at
/// registration fall back to [`Dependency::absent`] when no provider matches,
/// so only types with an absent value may be marked optional.
///
/// Implemented for:
/// - `Arc<T>` (including `Arc<dyn Trait>`), which has no absent value
/// - `Option<Arc<T>>`, looked up under the same key as `Arc<T>`, absent as `None`
/// - plain value types such as `String` or `u32` (see [`value_dependency!`](crate::value_dependency))
pub trait Dependency: Sized + 'static {
    fn key() -> TypeKey;

    fn from_value(value: &Value) -> Option<Self>;

    fn absent() -> Option<Self> {
        None
    }
}

/// A type a provider can produce and store in the container.
pub trait Component: Dependency + Send + Sync {
    fn into_value(self) -> Value;
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Arc<T> {
    fn key() -> TypeKey {
        TypeKey::of::<Arc<T>>()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Component for Arc<T> {
    fn into_value(self) -> Value {
        Arc::new(self)
    }
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Option<Arc<T>> {
    fn key() -> TypeKey {
        TypeKey::of::<Arc<T>>()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<Arc<T>>().cloned().map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// Implement [`Dependency`] and [`Component`] for plain value types.
///
/// The type must be `Clone + Default + Send + Sync + 'static`; its absent
/// value is `Default::default()`.
///
/// ```
/// #[derive(Clone, Default)]
/// struct Port(u16);
///
/// wireup::value_dependency!(Port);
/// ```
#[macro_export]
macro_rules! value_dependency {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Dependency for $ty {
                fn key() -> $crate::TypeKey {
                    $crate::TypeKey::of::<$ty>()
                }

                fn from_value(value: &$crate::Value) -> ::std::option::Option<Self> {
                    value.downcast_ref::<$ty>().cloned()
                }

                fn absent() -> ::std::option::Option<Self> {
                    ::std::option::Option::Some(<$ty as ::std::default::Default>::default())
                }
            }

            impl $crate::Component for $ty {
                fn into_value(self) -> $crate::Value {
                    ::std::sync::Arc::new(self)
                }
            }
        )*
    };
}

value_dependency!(
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_trait_object_round_trip() {
        let value = (Arc::new(English) as Arc<dyn Greeter>).into_value();
        let greeter = <Arc<dyn Greeter>>::from_value(&value).unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_option_shares_key_with_arc() {
        assert_eq!(
            <Option<Arc<dyn Greeter>>>::key(),
            <Arc<dyn Greeter>>::key()
        );
        assert!(matches!(<Option<Arc<dyn Greeter>>>::absent(), Some(None)));
        assert!(<Arc<dyn Greeter>>::absent().is_none());
    }

    #[test]
    fn test_value_types_default_to_zero() {
        assert_eq!(String::absent(), Some(String::new()));
        assert_eq!(u32::absent(), Some(0));
        assert!(String::from_value(&7u32.into_value()).is_none());
    }
}
