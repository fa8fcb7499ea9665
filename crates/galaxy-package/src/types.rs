//! Documents embedded in a Galaxy collection artifact.

use std::{collections::BTreeMap, fmt};

use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

pub const FILES_JSON: &str = "FILES.json";
pub const MANIFEST_JSON: &str = "MANIFEST.json";
pub const FORMAT_VERSION: u32 = 1;

/// One record of `FILES.json`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalaxyFile {
    pub name: String,
    pub ftype: String,
    pub chksum_type: String,
    pub chksum_sha256: String,
    pub format: u32,
}

impl GalaxyFile {
    pub fn new(name: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ftype: "file".into(),
            chksum_type: "sha256".into(),
            chksum_sha256: sha256.into(),
            format: FORMAT_VERSION,
        }
    }
}

/// `FILES.json`: the flat inventory of every packaged file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalaxyFiles {
    pub files: Vec<GalaxyFile>,
    pub format: u32,
}

impl Default for GalaxyFiles {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            format: FORMAT_VERSION,
        }
    }
}

/// Collection metadata declared in `galaxy.yml`.
///
/// Keys left empty in the declaration (`homepage:`) read as their default value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectionInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub readme: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "string_or_list")]
    pub license: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub license_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub repository: String,
    #[serde(deserialize_with = "null_as_default")]
    pub documentation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub homepage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub issues: String,
}

/// `MANIFEST.json`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalaxyManifest {
    pub collection_info: CollectionInfo,
    pub file_manifest_file: GalaxyFile,
    pub format: u32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `license: MIT` as well as `license: [MIT, Apache-2.0]`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrList;

    impl<'de> Visitor<'de> for StringOrList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(vec![value.to_string()])
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                values.push(value);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(StringOrList)
}
