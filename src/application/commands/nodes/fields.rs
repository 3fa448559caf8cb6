use std::collections::BTreeMap;

use super::NodeCommandService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::tree::{FieldValue, NodeId},
};

impl NodeCommandService {
    /// Check field names against the type metadata and convert them into
    /// assignable values.
    pub(super) fn field_values(
        &self,
        type_name: &str,
        text: BTreeMap<String, String>,
        references: BTreeMap<String, Option<i64>>,
    ) -> ApplicationResult<Vec<(String, FieldValue)>> {
        let mut values = Vec::with_capacity(text.len() + references.len());

        for (field, value) in text {
            if !self.metadata.has_field(type_name, &field) {
                return Err(ApplicationError::validation(format!(
                    "`{type_name}` has no field `{field}`"
                )));
            }
            values.push((field, FieldValue::Text(value)));
        }

        for (field, target) in references {
            if !self.metadata.is_single_valued_association(type_name, &field) {
                return Err(ApplicationError::validation(format!(
                    "`{type_name}.{field}` is not a single-valued association"
                )));
            }
            let target = target.map(NodeId::new).transpose()?;
            values.push((field, FieldValue::Reference(target)));
        }

        Ok(values)
    }
}
