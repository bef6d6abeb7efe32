use crate::load::error::LoadError;
use crate::load::graph::script::{select_keys, select_page};
use crate::load::traits::CommandExecutor;
use crate::transform::records::value_as_key;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;

/// Natural key (trimmed) to record id, e.g. `"933" -> "#25:7"`.
pub type RidMap = HashMap<String, String>;

/// Looks up the record ids of already loaded vertices.
#[derive(Debug)]
pub struct RidResolver<'a, E: ?Sized> {
    executor: &'a E,
    page_size: usize,
}

impl<'a, E: CommandExecutor + ?Sized> RidResolver<'a, E> {
    pub fn new(executor: &'a E, page_size: usize) -> Self {
        Self {
            executor,
            page_size: page_size.max(1),
        }
    }

    /// Pages through the whole class with `LIMIT`/`SKIP` until a short page.
    ///
    /// A failed or malformed page ends the scan; whatever was collected so far is returned.
    pub fn resolve(&self, class: &str, key_field: &str) -> RidMap {
        let mut rids = RidMap::new();
        let mut offset = 0;

        loop {
            let query = select_page(class, key_field, self.page_size, offset);
            let page = match self.fetch(&query, key_field) {
                Ok(page) => page,
                Err(err) => {
                    warn!("Could not fetch more record ids for '{class}': {err}");
                    break;
                }
            };
            let returned = page.returned;
            rids.extend(page.rows);
            debug!("Fetched {returned} record ids of '{class}' at offset {offset}.");

            if returned < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        info!("Resolved {} record ids for '{class}'.", rids.len());
        rids
    }

    /// Resolves only `keys`, in one `WHERE .. IN [..]` query. Empty input sends nothing.
    pub fn resolve_keys(&self, class: &str, key_field: &str, keys: &[String]) -> RidMap {
        if keys.is_empty() {
            return RidMap::new();
        }
        match self.fetch(&select_keys(class, key_field, keys), key_field) {
            Ok(page) => page.rows.into_iter().collect(),
            Err(err) => {
                warn!("Could not resolve {} keys of '{class}': {err}", keys.len());
                RidMap::new()
            }
        }
    }

    fn fetch(&self, query: &str, key_field: &str) -> Result<Page, LoadError> {
        let response = self.executor.execute(query, false)?;
        let rows = response
            .get("result")
            .and_then(Value::as_array)
            .ok_or_else(|| LoadError::MalformedResponse(format!("no result array for `{query}`")))?;

        Ok(Page {
            returned: rows.len(),
            rows: rows
                .iter()
                .filter_map(|row| {
                    let key = row.get(key_field).and_then(value_as_key)?;
                    let rid = row.get("@rid").and_then(value_as_key)?;
                    Some((key, rid))
                })
                .collect(),
        })
    }
}

/// One query result. `returned` counts every row, including those without a key or record id.
struct Page {
    returned: usize,
    rows: Vec<(String, String)>,
}
