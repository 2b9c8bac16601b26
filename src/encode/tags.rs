use crate::data::Tags;
use crate::errors::{Error, Result, MAX_TAG_LENGTH};

/// Rejects keys or values over the OSM length limit, counted in characters.
pub fn validate_tags(tags: &Tags) -> Result<()> {
    for (key, value) in tags {
        if key.chars().count() > MAX_TAG_LENGTH {
            return Err(Error::TagTooLong { part: "key", text: key.clone() });
        }
        if value.chars().count() > MAX_TAG_LENGTH {
            return Err(Error::TagTooLong { part: "value", text: value.clone() });
        }
    }
    Ok(())
}
