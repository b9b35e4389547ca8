// folding validated headers into the canonical host/scheme collections
use std::collections::HashMap;

use crate::core::error::{CapgenError, CapgenResult};
use crate::core::types::{HeaderKind, MetadataHeader};

/// Derived types registered so far in this run, in registration order.
///
/// Visibility is strictly forward: a DDT becomes usable only for files
/// processed after the file that declared it. The accumulator is threaded
/// explicitly through every parse and registration call; there is no
/// module-level cache, so the caller's file order is the only order.
#[derive(Debug, Clone, Default)]
pub struct KnownDdts(Vec<String>);

impl KnownDdts {
    pub fn new() -> Self {
        Self::default()
    }

    //Fortran type names are case-insensitive
    pub fn contains(&self, type_name: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }

    pub fn push(&mut self, title: impl Into<String>) {
        let title = title.into();
        if !self.contains(&title) {
            self.0.push(title);
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//duplicate-title check shared by both registries; the message names the
//new file and, when known, the file that registered the title first
fn duplicate_error(
    existing: &MetadataHeader,
    header: &MetadataHeader,
    file: &str,
) -> CapgenError {
    CapgenError::DuplicateHeader {
        kind: header.header_type,
        title: header.title.clone(),
        file: file.to_string(),
        original_file: existing.context.as_ref().map(|c| c.file.clone()),
    }
}

/// Canonical host-side collection: every validated host-file header,
/// keyed by title, plus the host name used by cap generation.
#[derive(Debug, Clone, Default)]
pub struct HostModel {
    name: Option<String>,
    order: Vec<String>,
    headers: HashMap<String, MetadataHeader>,
}

impl HostModel {
    pub fn new(name: Option<String>) -> Self {
        HostModel { name, order: Vec::new(), headers: HashMap::new() }
    }

    /// Fold one validated header into the model. A title collision is
    /// fatal for the whole run. DDT headers also extend `known_ddts`,
    /// making the type visible to every later file.
    pub fn register_header(
        &mut self,
        header: MetadataHeader,
        file: &str,
        known_ddts: &mut KnownDdts,
    ) -> CapgenResult<()> {
        if let Some(existing) = self.headers.get(&header.title) {
            return Err(duplicate_error(existing, &header, file));
        }
        if header.header_type == HeaderKind::Ddt {
            known_ddts.push(header.title.clone());
        }
        self.order.push(header.title.clone());
        self.headers.insert(header.title.clone(), header);
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn header(&self, title: &str) -> Option<&MetadataHeader> {
        self.headers.get(title)
    }

    pub fn headers_in_order(&self) -> impl Iterator<Item = &MetadataHeader> {
        self.order.iter().filter_map(|t| self.headers.get(t))
    }

    pub fn titles(&self) -> &[String] {
        &self.order
    }

    pub fn ddt_titles(&self) -> Vec<&str> {
        self.headers_in_order()
            .filter(|h| h.header_type == HeaderKind::Ddt)
            .map(|h| h.title.as_str())
            .collect()
    }

    /// Flattened list of every host-level local name, in registration
    /// order, skipping array-subscript references.
    pub fn local_name_list(&self) -> Vec<String> {
        self.headers_in_order()
            .flat_map(|h| h.variables.iter())
            .filter(|v| !v.is_array_reference())
            .map(|v| v.local_name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Canonical scheme-side collection. Schemes keep their insertion order
/// (it feeds later suite assembly) in addition to the title lookup.
#[derive(Debug, Clone, Default)]
pub struct SchemeLibrary {
    order: Vec<String>,
    headers: HashMap<String, MetadataHeader>,
}

impl SchemeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same duplicate semantics as the host model, with one addition:
    /// titles are unique across the union of host and scheme headers in
    /// a run, so a collision with an already-registered host header is
    /// also fatal.
    pub fn register_header(
        &mut self,
        header: MetadataHeader,
        file: &str,
        host_model: &HostModel,
        known_ddts: &mut KnownDdts,
    ) -> CapgenResult<()> {
        if let Some(existing) = self.headers.get(&header.title) {
            return Err(duplicate_error(existing, &header, file));
        }
        if let Some(existing) = host_model.header(&header.title) {
            return Err(duplicate_error(existing, &header, file));
        }
        if header.header_type == HeaderKind::Ddt {
            known_ddts.push(header.title.clone());
        }
        self.order.push(header.title.clone());
        self.headers.insert(header.title.clone(), header);
        Ok(())
    }

    pub fn header(&self, title: &str) -> Option<&MetadataHeader> {
        self.headers.get(title)
    }

    pub fn headers_in_order(&self) -> impl Iterator<Item = &MetadataHeader> {
        self.order.iter().filter_map(|t| self.headers.get(t))
    }

    pub fn titles(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MetadataVariable, Provenance};

    fn mk_header(title: &str, kind: HeaderKind, file: &str) -> MetadataHeader {
        MetadataHeader {
            title: title.to_string(),
            header_type: kind,
            variables: vec![],
            context: Some(Provenance::new(file)),
        }
    }

    fn mk_var(local_name: &str) -> MetadataVariable {
        MetadataVariable {
            local_name: local_name.to_string(),
            standard_name: format!("{local_name}_std"),
            var_type: "real".to_string(),
            kind: String::new(),
            intent: None,
            dimensions: vec![],
        }
    }

    #[test]
    fn duplicate_titles_always_fail_even_when_identical() {
        let mut model = HostModel::new(None);
        let mut ddts = KnownDdts::new();
        let header = mk_header("host_vars", HeaderKind::Host, "a.meta.json");
        model
            .register_header(header.clone(), "a.meta.json", &mut ddts)
            .unwrap();

        let err = model
            .register_header(header, "b.meta.json", &mut ddts)
            .unwrap_err();
        match err {
            CapgenError::DuplicateHeader { title, file, original_file, .. } => {
                assert_eq!(title, "host_vars");
                assert_eq!(file, "b.meta.json");
                assert_eq!(original_file.as_deref(), Some("a.meta.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn registering_a_ddt_extends_known_types_in_order() {
        let mut model = HostModel::new(Some("atmos".to_string()));
        let mut ddts = KnownDdts::new();
        model
            .register_header(mk_header("state_type", HeaderKind::Ddt, "a.meta.json"), "a.meta.json", &mut ddts)
            .unwrap();
        model
            .register_header(mk_header("host_vars", HeaderKind::Host, "a.meta.json"), "a.meta.json", &mut ddts)
            .unwrap();
        model
            .register_header(mk_header("flux_type", HeaderKind::Ddt, "b.meta.json"), "b.meta.json", &mut ddts)
            .unwrap();

        assert_eq!(ddts.titles(), &["state_type".to_string(), "flux_type".to_string()]);
        assert!(ddts.contains("State_Type")); //Fortran names are case-insensitive
        assert!(!ddts.contains("other_type"));
        assert_eq!(model.ddt_titles(), vec!["state_type", "flux_type"]);
    }

    #[test]
    fn scheme_titles_collide_with_host_titles_too() {
        let mut model = HostModel::new(None);
        let mut schemes = SchemeLibrary::new();
        let mut ddts = KnownDdts::new();
        model
            .register_header(mk_header("shared", HeaderKind::Host, "host.meta.json"), "host.meta.json", &mut ddts)
            .unwrap();

        let err = schemes
            .register_header(
                mk_header("shared", HeaderKind::Scheme, "scheme.meta.json"),
                "scheme.meta.json",
                &model,
                &mut ddts,
            )
            .unwrap_err();
        assert!(matches!(err, CapgenError::DuplicateHeader { .. }));
    }

    #[test]
    fn scheme_registration_order_is_preserved() {
        let model = HostModel::new(None);
        let mut schemes = SchemeLibrary::new();
        let mut ddts = KnownDdts::new();
        for title in ["rain_init", "rain_run", "rain_finalize"] {
            schemes
                .register_header(
                    mk_header(title, HeaderKind::Scheme, "rain.meta.json"),
                    "rain.meta.json",
                    &model,
                    &mut ddts,
                )
                .unwrap();
        }
        let order: Vec<&str> = schemes.headers_in_order().map(|h| h.title.as_str()).collect();
        assert_eq!(order, vec!["rain_init", "rain_run", "rain_finalize"]);
    }

    #[test]
    fn local_name_list_flattens_in_order_and_skips_array_references() {
        let mut model = HostModel::new(None);
        let mut ddts = KnownDdts::new();
        let mut first = mk_header("host_vars", HeaderKind::Host, "a.meta.json");
        first.variables = vec![mk_var("temp"), mk_var("pressure")];
        let mut second = mk_header("more_vars", HeaderKind::Host, "b.meta.json");
        let mut aref = mk_var("q(:,:,1)");
        aref.local_name = "q(:,:,1)".to_string();
        second.variables = vec![mk_var("q"), aref];
        model.register_header(first, "a.meta.json", &mut ddts).unwrap();
        model.register_header(second, "b.meta.json", &mut ddts).unwrap();

        assert_eq!(model.local_name_list(), vec!["temp", "pressure", "q"]);
    }
}
