use std::fmt;

use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize, Serialize, Serializer,
};

use crate::{base32, Ulid};

impl Serialize for Ulid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut buffer = [0; 26];
        serializer.serialize_str(base32::encode(self.to_u128(), &mut buffer))
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UlidVisitor;

        impl Visitor<'_> for UlidVisitor {
            type Value = Ulid;
            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 26 character ULID string")
            }
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.parse().map_err(de::Error::custom)
            }
            fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
                Ulid::try_from(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(UlidVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_derive::{Deserialize, Serialize};

    use crate::Ulid;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Record {
        id: Ulid,
    }

    #[test]
    fn test_json() {
        let record = Record {
            id: Ulid::from_u128(0x0192_c059_6cd1_4fd4_2f5c_dd1c_c2d5_436a),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"01JB05JV6H9ZA2YQ6X3K1DAGVA"}"#); // cspell:disable-line

        let lowercase: Record = serde_json::from_str(&json.to_lowercase()).unwrap();
        assert_eq!(lowercase, record);

        assert!(serde_json::from_str::<Record>(r#"{"id":"01JB05JV6H9ZA2YQ6X3K1DAGV"}"#).is_err()); // cspell:disable-line
    }
}
