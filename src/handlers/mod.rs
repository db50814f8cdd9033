pub mod account;
pub mod admin;
pub mod quiz;

/// Deserialize a value that may be either a JSON number or a string containing a number.
/// HTML forms via htmx json-enc always send values as strings.
fn deserialize_string_or_i32<'de, D: serde::Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    struct Vis;
    impl serde::de::Visitor<'_> for Vis {
        type Value = i32;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("number or numeric string")
        }
        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<i32, E> {
            i32::try_from(v).map_err(E::custom)
        }
        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<i32, E> {
            i32::try_from(v).map_err(E::custom)
        }
        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<i32, E> {
            v.parse().map_err(E::custom)
        }
    }
    d.deserialize_any(Vis)
}

/// Same as [`deserialize_string_or_i32`], for zero-based option indexes.
fn deserialize_string_or_usize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    struct Vis;
    impl serde::de::Visitor<'_> for Vis {
        type Value = usize;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("number or numeric string")
        }
        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<usize, E> {
            usize::try_from(v).map_err(E::custom)
        }
        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<usize, E> {
            usize::try_from(v).map_err(E::custom)
        }
        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<usize, E> {
            v.parse().map_err(E::custom)
        }
    }
    d.deserialize_any(Vis)
}
