/*++

Licensed under the Apache-2.0 license.

File Name:

    macros.rs

Abstract:

    Macros used by the project

--*/

/// Declares an enum that encodes a fixed-width wire field. Every variant maps
/// to one wire value and a display name; any other wire value decodes to the
/// catch-all variant, which keeps the raw bits so that conversion back to the
/// wire is lossless.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$($enum_attrs:tt)*])*
        $vis:vis $enum_name:ident;
        $type:ty;
        {
            $(
                $(#[$($attrs:tt)*])*
                $name:ident = $value:literal => $display:literal,
            )*
        };
        $invalid:ident
    ) => {
        $(#[$($enum_attrs)*])*
        $vis enum $enum_name {
            $(
                $(#[$($attrs)*])*
                $name,
            )*
            $invalid($type),
        }

        impl From<$enum_name> for $type {
            fn from(val: $enum_name) -> $type {
                match val {
                    $($enum_name::$name => $value,)*
                    $enum_name::$invalid(raw) => raw,
                }
            }
        }

        impl From<$type> for $enum_name {
            fn from(val: $type) -> $enum_name {
                match val {
                    $($value => $enum_name::$name,)*
                    raw => $enum_name::$invalid(raw),
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                match self {
                    $($enum_name::$name => write!(f, $display),)*
                    $enum_name::$invalid(raw) => write!(f, "{}({:#x})", stringify!($invalid), raw),
                }
            }
        }
    };
}
