//! An ordered list of field codecs: total bit width, name lookup, validation,
//! and the name->value <-> code-sequence conversions the bit packer and the
//! metric-array builder both sit on top of.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::field::FieldCoding;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordCoding {
    fields: Vec<FieldCoding>,
}

impl RecordCoding {
    pub fn new(fields: Vec<FieldCoding>) -> Result<Self, Error> {
        let record = RecordCoding { fields };
        record.validate()?;
        debug!(
            fields = record.fields.len(),
            total_bits = record.total_bits(),
            "built record coding"
        );
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(Error::ConfigInvalid {
                    field: field.name.clone(),
                    reason: "duplicate field name in record".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn total_bits(&self) -> u64 {
        self.fields.iter().map(|f| f.bits() as u64).sum()
    }

    pub fn fields(&self) -> &[FieldCoding] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldCoding> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Encode a name->value mapping to one code per field, in declaration
    /// order. Fields absent from `values` encode as missing (`MaxCode`);
    /// omitted/const fields never consult `values`.
    pub fn encode_codes(&self, values: &HashMap<String, Value>) -> Result<Vec<u64>, Error> {
        self.fields
            .iter()
            .map(|field| {
                if field.omit {
                    return Ok(0);
                }
                if field.is_enum() {
                    return match values.get(&field.name) {
                        Some(v) => field.encode_enum(v.as_str().unwrap_or_default()),
                        None => Ok(field.max_code()),
                    };
                }
                if field.const_value.is_some() {
                    return field.encode_real(f64::NAN);
                }
                match values.get(&field.name) {
                    Some(v) => field.encode_real(v.as_f64()),
                    None => Ok(field.max_code()),
                }
            })
            .collect()
    }

    /// Decode one code per field (declaration order) back to a name->value
    /// mapping. Omitted fields never appear in the output.
    pub fn decode_codes(&self, codes: &[u64]) -> Result<HashMap<String, Value>, Error> {
        if codes.len() != self.fields.len() {
            return Err(Error::ConfigInvalid {
                field: "<record>".to_string(),
                reason: format!(
                    "expected {} codes, got {}",
                    self.fields.len(),
                    codes.len()
                ),
            });
        }
        let mut out = HashMap::with_capacity(self.fields.len());
        for (field, &code) in self.fields.iter().zip(codes) {
            if field.omit {
                continue;
            }
            if field.is_enum() {
                out.insert(field.name.clone(), Value::Str(field.decode_enum(code)?));
            } else {
                out.insert(field.name.clone(), Value::F64(field.decode_real(code)?));
            }
        }
        Ok(out)
    }
}
