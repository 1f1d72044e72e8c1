use feedwatch_common::{FeedError, Record, Result};

/// `(source, destination)` field renames for one feed.
pub type KeyTransformTable = [(&'static str, &'static str)];

/// Rename source fields to destination fields in every record.
///
/// Each record is checked for every source field before anything moves, and
/// all sources are lifted out before any destination is written, so a
/// destination may reuse the name of another pair's source.
pub fn remap(records: Vec<Record>, table: &KeyTransformTable) -> Result<Vec<Record>> {
    records
        .into_iter()
        .map(|record| remap_record(record, table))
        .collect()
}

fn remap_record(mut record: Record, table: &KeyTransformTable) -> Result<Record> {
    if let Some((missing, _)) = table.iter().find(|(src, _)| !record.contains(src)) {
        return Err(FeedError::MissingField(missing.to_string()));
    }

    let mut moved = Vec::with_capacity(table.len());
    for (src, dest) in table {
        if let Some(value) = record.remove(src) {
            moved.push((*dest, value));
        }
    }
    for (dest, value) in moved {
        record.insert(dest, value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from(map),
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn renames_and_leaves_other_fields() {
        const TABLE: &KeyTransformTable = &[("pubDate", "publisheddate"), ("guid", "id")];
        let out = remap(
            vec![record(json!({"pubDate": "2020-01-01", "guid": "EQ42", "title": "t"}))],
            TABLE,
        )
        .unwrap();
        assert_eq!(
            out[0],
            record(json!({"publisheddate": "2020-01-01", "id": "EQ42", "title": "t"}))
        );
    }

    #[test]
    fn missing_source_names_the_field() {
        const TABLE: &KeyTransformTable = &[("pubDate", "publisheddate"), ("guid", "id")];
        let err = remap(vec![record(json!({"pubDate": "2020-01-01"}))], TABLE).unwrap_err();
        assert!(matches!(err, FeedError::MissingField(ref f) if f == "guid"));
    }

    #[test]
    fn null_source_still_counts_as_present() {
        const TABLE: &KeyTransformTable = &[("glide", "glide_number")];
        let out = remap(vec![record(json!({"glide": null}))], TABLE).unwrap();
        assert_eq!(out[0], record(json!({"glide_number": null})));
    }

    #[test]
    fn destination_may_reuse_a_source_name() {
        const TABLE: &KeyTransformTable = &[("country", "countries_affected"), ("country_gdal", "country")];
        let out = remap(
            vec![record(json!({"country": "Peru, Chile", "country_gdal": "Peru"}))],
            TABLE,
        )
        .unwrap();
        assert_eq!(
            out[0],
            record(json!({"countries_affected": "Peru, Chile", "country": "Peru"}))
        );
    }
}
