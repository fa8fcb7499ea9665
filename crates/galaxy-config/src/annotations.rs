//! Renders `documented` field docs as TOML comments, for the generated default config.

use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// `# `-prefixed copy of `docs`; blank lines become a bare `#`.
fn comment_block(docs: &str) -> String {
    docs.lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

/// Adds `docs` as comments above whatever `decor` already carries, separated from an
/// existing comment by an empty `#` line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let comments = comment_block(docs);
    let prefix = match decor.prefix().and_then(RawString::as_str) {
        None | Some("") => comments,
        Some(existing) if existing.ends_with("\n\n") || !existing.contains('#') => {
            format!("{existing}{comments}")
        }
        Some(existing) => format!("{existing}#\n{comments}"),
    };
    decor.set_prefix(prefix);
}

/// Documents every key of `table` from the field docs of `T`. The type's own docs go
/// on top of the table unless it is the document root.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let Ok(docs) = T::get_field_docs(key.get()) else {
            warn!("no documentation for config key '{}'", key.get());
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(key.get().into())),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    append_docs_as_toml_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}
