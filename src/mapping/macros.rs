// wire_enum
/// Declare an enumeration that can sit in a mapped record field.
///
/// The enum travels as its case name (`S`), never as its ordinal, so cases
/// can be added or reordered without corrupting stored data. The first case
/// is the [`Default`]. The macro supplies `Clone`, `Copy`, `Debug`, `Default`,
/// `PartialEq`, `Eq` and `Hash`; do not derive them again.
///
/// ```ignore
/// ferrum_dynamo::wire_enum! {
///     pub enum JobStatus { Unprocessed, Processing, Processed }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident $(, $rest:ident)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis enum $name {
            #[default]
            $first,
            $($rest,)*
        }

        impl $name {
            /// Declared case names, in declaration order.
            pub const CASES: &'static [&'static str] = &[stringify!($first) $(, stringify!($rest))*];

            pub const ALL: &'static [$name] = &[$name::$first $(, $name::$rest)*];

            pub fn name(&self) -> &'static str {
                match self {
                    $name::$first => stringify!($first),
                    $($name::$rest => stringify!($rest),)*
                }
            }

            pub fn from_name(name: &str) -> Option<$name> {
                $name::ALL.iter().copied().find(|case| case.name() == name)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $name::from_name(s).ok_or_else(|| $crate::Error::WireFormat {
                    field: None,
                    native: stringify!($name).to_string(),
                    payload: s.to_string(),
                    reason: format!("expected one of [{}]", $name::CASES.join(", ")),
                })
            }
        }

        impl $crate::mapping::FieldValue for $name {
            const NATIVE: $crate::mapping::NativeType =
                $crate::mapping::NativeType::Enumeration($name::CASES);

            fn to_scalar(&self) -> Option<$crate::mapping::ScalarValue> {
                Some($crate::mapping::ScalarValue::Enumeration(self.name()))
            }

            fn from_scalar(value: $crate::mapping::ScalarValue) -> Option<Self> {
                match value {
                    $crate::mapping::ScalarValue::Enumeration(name) => $name::from_name(name),
                    _ => None,
                }
            }
        }
    };
}
