//! Enum types exposed through component schemas

/// An enum whose members can be listed and converted to and from integers
///
/// Normally implemented with [`schema_enum!`](crate::schema_enum).
pub trait SchemaEnum: Copy + Default + Send + Sync + 'static {
    /// Enum type name
    const NAME: &'static str;

    /// Ordered `(name, value)` members
    fn members() -> &'static [(&'static str, i32)];

    /// Integer value of this member
    fn to_value(self) -> i32;

    /// Member with integer value `value`
    fn from_value(value: i32) -> Option<Self>;
}

/// Ordered member names and values of a registered enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    /// Enum type name
    pub name: &'static str,
    /// Ordered `(name, value)` members
    pub members: &'static [(&'static str, i32)],
}

impl EnumInfo {
    /// Info for `E`
    pub fn of<E: SchemaEnum>() -> Self {
        Self {
            name: E::NAME,
            members: E::members(),
        }
    }

    /// Member names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.members.iter().map(|(name, _)| *name)
    }

    /// Member values in declaration order
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.members.iter().map(|(_, value)| *value)
    }

    /// Name of the member with integer value `value`
    pub fn name_of(&self, value: i32) -> Option<&'static str> {
        self.members.iter().find(|(_, v)| *v == value).map(|(n, _)| *n)
    }

    /// Integer value of the member called `name`
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.members.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// Declare a `#[repr(i32)]` enum implementing [`SchemaEnum`]
///
/// Every variant needs an explicit value. Mark one variant `#[default]` and
/// derive `Default` to choose the value new array elements start with.
///
/// ```ignore
/// schema_enum! {
///     #[derive(Default)]
///     pub enum Weekday {
///         #[default]
///         Monday = 0,
///         Tuesday = 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::schema::SchemaEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn members() -> &'static [(&'static str, i32)] {
                &[ $( (stringify!($variant), $value) ),+ ]
            }

            fn to_value(self) -> i32 {
                self as i32
            }

            fn from_value(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::schema_enum! {
        #[derive(Default)]
        enum Shift {
            #[default]
            Morning = 0,
            Evening = 5,
            Night = 9,
        }
    }

    #[test]
    fn test_members_in_order() {
        let info = EnumInfo::of::<Shift>();
        assert_eq!(info.name, "Shift");
        assert_eq!(info.names().collect::<Vec<_>>(), vec!["Morning", "Evening", "Night"]);
        assert_eq!(info.values().collect::<Vec<_>>(), vec![0, 5, 9]);
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(Shift::Evening.to_value(), 5);
        assert_eq!(Shift::from_value(9), Some(Shift::Night));
        assert_eq!(Shift::from_value(1), None);
        assert_eq!(Shift::default(), Shift::Morning);

        let info = EnumInfo::of::<Shift>();
        assert_eq!(info.name_of(5), Some("Evening"));
        assert_eq!(info.value_of("Night"), Some(9));
    }
}
