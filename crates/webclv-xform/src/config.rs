//! Configuration (C1): every synthesized identifier the Transformer emits,
//! and the derivation rules that build them from a variable, parameter, or
//! checker classification. A builder so the prefix, indentation, and strict
//! mode can be overridden without touching call sites that only read them.

use webclv_ast::AddressSpace;

/// Which kind of checker a (space, element-type) pair needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckerKind {
    Ptr,
    Idx,
}

impl CheckerKind {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Ptr => "ptr",
            Self::Idx => "idx",
        }
    }
}

/// Synthesized-name policy and indentation/strictness knobs for one run.
///
/// Default prefix is `"wcl"`, chosen to be collision-proof against ordinary
/// OpenCL kernel source while staying short enough to read in generated code.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    prefix: String,
    indent: String,
    strict: bool,
}

impl ValidatorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: "wcl".to_string(),
            indent: "    ".to_string(),
            strict: false,
        }
    }

    /// Override the identifier prefix used for every synthesized name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Override the indentation used in emitted prologue text.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Escalate unsafe-builtin warnings (C2/C4) to fatal diagnostics.
    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn address_space_tag(space: AddressSpace) -> &'static str {
        match space {
            AddressSpace::Private => "private",
            AddressSpace::Local => "local",
            AddressSpace::Constant => "constant",
            AddressSpace::Global => "global",
        }
    }

    #[must_use]
    pub fn record_type_name(&self, space: AddressSpace) -> String {
        format!("{}_{}_record", self.prefix, Self::address_space_tag(space))
    }

    #[must_use]
    pub fn record_instance_name(&self, space: AddressSpace) -> String {
        format!("{}_{}s", self.prefix, Self::address_space_tag(space))
    }

    /// `private`/`local`/`constant`/`global` are context-sensitive keywords
    /// in OpenCL C, so the envelope's own field names carry a `_space`
    /// suffix to stay clear of them.
    #[must_use]
    pub fn envelope_field_name(space: AddressSpace) -> &'static str {
        match space {
            AddressSpace::Private => "private_space",
            AddressSpace::Local => "local_space",
            AddressSpace::Constant => "constant_space",
            AddressSpace::Global => "global_space",
        }
    }

    #[must_use]
    pub fn envelope_type_name(&self) -> String {
        format!("{}_envelope", self.prefix)
    }

    #[must_use]
    pub fn envelope_instance_name(&self) -> String {
        format!("{}_envelope_value", self.prefix)
    }

    /// `name-of-size-parameter(p)` = `{prefix}_{p.name}_size`.
    #[must_use]
    pub fn size_param_name(&self, param_name: &str) -> String {
        format!("{}_{param_name}_size", self.prefix)
    }

    /// `name-of-relocated-variable(v)` = `{prefix}_{v.name}`.
    #[must_use]
    pub fn relocated_field_name(&self, var_name: &str) -> String {
        format!("{}_{var_name}", self.prefix)
    }

    /// `name-of-checker(kind, space, type)` = `{prefix}_{space}_{type}_{suffix}`.
    #[must_use]
    pub fn checker_name(&self, kind: CheckerKind, space: AddressSpace, element_type: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            self.prefix,
            Self::address_space_tag(space),
            element_type,
            kind.suffix()
        )
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_rules_match_the_documented_templates() {
        let cfg = ValidatorConfig::new();
        assert_eq!(cfg.size_param_name("a"), "wcl_a_size");
        assert_eq!(cfg.relocated_field_name("x"), "wcl_x");
        assert_eq!(cfg.checker_name(CheckerKind::Ptr, AddressSpace::Private, "int"), "wcl_private_int_ptr");
        assert_eq!(cfg.checker_name(CheckerKind::Idx, AddressSpace::Global, "float"), "wcl_global_float_idx");
    }

    #[test]
    fn prefix_override_propagates() {
        let cfg = ValidatorConfig::new().with_prefix("ocl");
        assert_eq!(cfg.size_param_name("a"), "ocl_a_size");
        assert_eq!(cfg.envelope_type_name(), "ocl_envelope");
    }
}
