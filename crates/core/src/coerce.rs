//! Conversion of document values into declared host types
//!
//! The table is closed: every supported target kind is listed in
//! [`Coercer::coerce`], and anything else fails with
//! [`Error::UnsupportedCoercion`]. There is no stringify-everything fallback.

use crate::cache::ShapeCache;
use crate::document::{DocValue, Document, describe};
use crate::error::{Error, Result};
use crate::live::{EnumValue, Live};
use crate::shape::ValueType;
use std::path::{Path, PathBuf};

/// Whether `target` has an entry in the coercion table
pub fn has_scalar_coercion(target: &ValueType) -> bool {
    matches!(
        target,
        ValueType::Bool
            | ValueType::Int
            | ValueType::Long
            | ValueType::Double
            | ValueType::String
            | ValueType::Enum(_)
            | ValueType::Path
            | ValueType::Any
    )
}

/// Converts document scalars into [`Live`] values of a declared type
#[derive(Debug, Clone, Copy)]
pub struct Coercer<'a> {
    project_root: &'a Path,
}

impl<'a> Coercer<'a> {
    /// Relative paths are resolved against `project_root`
    pub fn new(project_root: &'a Path) -> Self {
        Self { project_root }
    }

    /// Coerce `table[key]`; `path` names the key in diagnostics
    pub fn coerce_scalar(
        &self,
        table: &Document,
        key: &str,
        target: &ValueType,
        path: &str,
    ) -> Result<Live> {
        self.coerce(table.get(key), target, path)
    }

    /// Coerce `array[index]`
    pub fn coerce_array_element(
        &self,
        array: &[DocValue],
        index: usize,
        target: &ValueType,
        path: &str,
    ) -> Result<Live> {
        let element_path = format!("{path}[{index}]");
        self.coerce(array.get(index), target, &element_path)
    }

    /// Coerce a possibly absent value
    pub fn coerce(&self, value: Option<&DocValue>, target: &ValueType, path: &str) -> Result<Live> {
        let value = value.ok_or_else(|| Error::MissingValue {
            path: path.to_string(),
        })?;
        let unsupported = || Error::UnsupportedCoercion {
            path: path.to_string(),
            target: target.to_string(),
            found: describe(value),
        };

        let live = match (target, value) {
            (ValueType::Bool, DocValue::Boolean(b)) => Live::Bool(*b),
            (ValueType::Int, DocValue::Integer(i)) => {
                Live::Int(i32::try_from(*i).map_err(|_| unsupported())?)
            }
            (ValueType::Long, DocValue::Integer(i)) => Live::Long(*i),
            (ValueType::Double, DocValue::Float(f)) => Live::Double(*f),
            (ValueType::Double, DocValue::Integer(i)) => Live::Double(*i as f64),
            (ValueType::String, DocValue::String(s)) => Live::Str(s.clone()),
            (ValueType::Enum(e), DocValue::String(s)) => {
                let constant = e.value_of(s).ok_or_else(unsupported)?;
                Live::Enum(EnumValue { ty: *e, constant })
            }
            (ValueType::Path, DocValue::String(s)) => Live::Path(self.resolve_path(s)),
            (ValueType::Any, raw) => Live::Raw(raw.clone()),
            _ => return Err(unsupported()),
        };
        tracing::trace!("Coerced `{}` to {:?}", path, live);
        Ok(live)
    }

    /// Resolve a document path string against the project root
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Build a value through a static factory of `target`, e.g. `valueOf`
///
/// Returns `Ok(None)` when `target` has no factory named `factory`.
pub fn invoke_static_factory(
    cache: &ShapeCache,
    target: &ValueType,
    factory: &str,
    argument: &str,
    path: &str,
) -> Result<Option<Live>> {
    match target {
        ValueType::Enum(e) if factory == "valueOf" => match e.value_of(argument) {
            Some(constant) => Ok(Some(Live::Enum(EnumValue { ty: *e, constant }))),
            None => Err(Error::UnsupportedCoercion {
                path: path.to_string(),
                target: e.name().to_string(),
                found: format!("constant {argument:?}"),
            }),
        },
        ValueType::Object(ty) => {
            let shape = cache.shape_of(*ty);
            match shape.static_factory(factory) {
                Some(f) => {
                    tracing::debug!("{} built using static {}", ty.name(), f.name());
                    f.call(argument).map(Some)
                }
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    crate::dsl_enum! {
        enum Version {
            V11 => "VERSION_11",
            V17 => "VERSION_17",
        }
    }

    fn doc() -> Document {
        parse_document(
            "test",
            r#"
            flag = true
            count = 42
            big = 5000000000
            ratio = 0.5
            name = "app"
            version = "VERSION_17"
            file = "proguard.txt"
            absolute = "/etc/rules.pro"
            items = ["a.txt", "b.txt"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_primitive_coercions() {
        let coercer = Coercer::new(Path::new("/project"));
        let doc = doc();
        assert!(matches!(coercer.coerce_scalar(&doc, "flag", &ValueType::Bool, "flag").unwrap(), Live::Bool(true)));
        assert!(matches!(coercer.coerce_scalar(&doc, "count", &ValueType::Int, "count").unwrap(), Live::Int(42)));
        assert!(matches!(coercer.coerce_scalar(&doc, "big", &ValueType::Long, "big").unwrap(), Live::Long(5_000_000_000)));
        assert!(matches!(coercer.coerce_scalar(&doc, "ratio", &ValueType::Double, "ratio").unwrap(), Live::Double(r) if r == 0.5));
        assert!(matches!(coercer.coerce_scalar(&doc, "name", &ValueType::String, "name").unwrap(), Live::Str(s) if s == "app"));
    }

    #[test]
    fn test_int_overflow_is_unsupported() {
        let coercer = Coercer::new(Path::new("/project"));
        let err = coercer.coerce_scalar(&doc(), "big", &ValueType::Int, "big").unwrap_err();
        assert!(matches!(err, Error::UnsupportedCoercion { .. }));
    }

    #[test]
    fn test_enum_and_path() {
        let coercer = Coercer::new(Path::new("/project"));
        let doc = doc();
        let version = coercer
            .coerce_scalar(&doc, "version", &ValueType::enumeration::<Version>(), "version")
            .unwrap();
        assert!(matches!(version, Live::Enum(v) if v.constant == "VERSION_17"));

        let file = coercer.coerce_scalar(&doc, "file", &ValueType::Path, "file").unwrap();
        assert!(matches!(file, Live::Path(p) if p == Path::new("/project/proguard.txt")));

        let absolute = coercer.coerce_scalar(&doc, "absolute", &ValueType::Path, "absolute").unwrap();
        assert!(matches!(absolute, Live::Path(p) if p == Path::new("/etc/rules.pro")));
    }

    #[test]
    fn test_any_passes_raw_value_through() {
        let coercer = Coercer::new(Path::new("/project"));
        let raw = coercer.coerce_scalar(&doc(), "items", &ValueType::Any, "items").unwrap();
        assert!(matches!(raw, Live::Raw(DocValue::Array(a)) if a.len() == 2));
    }

    #[test]
    fn test_array_elements() {
        let coercer = Coercer::new(Path::new("/project"));
        let doc = doc();
        let items = doc["items"].as_array().unwrap();
        let second = coercer.coerce_array_element(items, 1, &ValueType::String, "items").unwrap();
        assert!(matches!(second, Live::Str(s) if s == "b.txt"));

        let err = coercer.coerce_array_element(items, 5, &ValueType::String, "items").unwrap_err();
        match err {
            Error::MissingValue { path } => assert_eq!(path, "items[5]"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_no_implicit_stringify() {
        let coercer = Coercer::new(Path::new("/project"));
        let err = coercer.coerce_scalar(&doc(), "count", &ValueType::String, "android.count").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Cannot convert integer 42 to String at `android.count`");
    }

    #[test]
    fn test_missing_and_unknown_targets() {
        let coercer = Coercer::new(Path::new("/project"));
        let doc = doc();
        assert!(matches!(
            coercer.coerce_scalar(&doc, "absent", &ValueType::Bool, "absent"),
            Err(Error::MissingValue { .. })
        ));
        assert!(matches!(
            coercer.coerce_scalar(&doc, "name", &ValueType::list(ValueType::String), "name"),
            Err(Error::UnsupportedCoercion { .. })
        ));
        assert!(has_scalar_coercion(&ValueType::Path));
        assert!(!has_scalar_coercion(&ValueType::map(ValueType::String)));
    }

    #[test]
    fn test_enum_value_of_factory() {
        let cache = ShapeCache::new();
        let target = ValueType::enumeration::<Version>();
        let built = invoke_static_factory(&cache, &target, "valueOf", "VERSION_11", "v").unwrap();
        assert!(matches!(built, Some(Live::Enum(v)) if v.constant == "VERSION_11"));
        assert!(invoke_static_factory(&cache, &target, "parse", "VERSION_11", "v").unwrap().is_none());
        assert!(invoke_static_factory(&cache, &target, "valueOf", "VERSION_99", "v").is_err());
    }
}
