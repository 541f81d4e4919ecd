//! Strongly-typed ID newtypes for domain entities.
//!
//! Every table uses a serial `INTEGER` primary key. Wrapping the raw `i32`
//! per entity keeps a `ClassroomId` from being passed where a `UserId` is
//! expected.
//!
//! # Example
//!
//! ```ignore
//! use reservo_models::ids::{ClassroomId, UserId};
//!
//! fn occupant_of(user: UserId, classroom: ClassroomId) { /* ... */ }
//!
//! occupant_of(UserId::new(3), ClassroomId::new(12)); // OK
//! // occupant_of(ClassroomId::new(12), UserId::new(3)); // Compile error
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = i32)]
        pub struct $name(pub i32);

        impl $name {
            #[inline]
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            #[inline]
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            #[inline]
            fn from(id: $name) -> i32 {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i32>().map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <i32 as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <i32 as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i32 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <i32 as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <i32 as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// Strongly-typed ID for Building entities.
    BuildingId
);

define_id!(
    /// Strongly-typed ID for Department entities.
    DepartmentId
);

define_id!(
    /// Strongly-typed ID for Classroom entities.
    ClassroomId
);

define_id!(
    /// Strongly-typed ID for User entities.
    UserId
);

define_id!(
    /// Strongly-typed ID for reservation Request entities.
    RequestId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_debug_names_the_entity() {
        assert_eq!(format!("{:?}", UserId::new(7)), "UserId(7)");
        assert_eq!(format!("{:?}", ClassroomId::new(7)), "ClassroomId(7)");
    }

    #[test]
    fn test_id_display_is_bare_number() {
        assert_eq!(BuildingId::new(42).to_string(), "42");
    }

    #[test]
    fn test_id_from_str() {
        let id: RequestId = "15".parse().unwrap();
        assert_eq!(id.get(), 15);
        assert!("fifteen".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&DepartmentId::new(3)).unwrap(), "3");
        let id: DepartmentId = serde_json::from_str("3").unwrap();
        assert_eq!(id, DepartmentId::new(3));
        assert!(serde_json::from_str::<DepartmentId>(r#""3""#).is_err());
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids = vec![UserId::new(10), UserId::new(2), UserId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![UserId::new(2), UserId::new(7), UserId::new(10)]);
    }
}
