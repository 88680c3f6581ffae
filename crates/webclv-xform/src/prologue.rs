//! Prologue synthesis: the address-space records, the envelope record, the
//! limit/checker macros, and their per-type instantiations (component
//! design 4.6, "Prologue emission").

use std::collections::BTreeMap;

use webclv_ast::{AddressSpace, Type};

use crate::config::ValidatorConfig;

pub struct RelocatedVar {
    pub name: String,
    pub ty: Type,
    pub init_text: Option<String>,
}

/// Renders the address-space records, the envelope record, and the fixed
/// limit/checker macros, followed by one instantiation per checked type.
#[must_use]
pub fn render(
    config: &ValidatorConfig,
    relocated: &BTreeMap<AddressSpace, Vec<RelocatedVar>>,
    checked_pointer_types: &[(AddressSpace, String)],
    checked_index_types: &[(AddressSpace, String)],
) -> String {
    let mut out = String::new();

    for space in AddressSpace::all() {
        if let Some(vars) = relocated.get(&space) {
            if !vars.is_empty() {
                out.push_str(&render_record(config, space, vars));
            }
        }
    }
    out.push_str(&render_envelope_record(config, relocated));
    out.push('\n');
    out.push_str(FIXED_MACROS);
    out.push('\n');

    for (space, elem) in checked_pointer_types {
        out.push_str(&format!("WCL_PTR_CHECKER({}, {})\n", ValidatorConfig::address_space_tag(*space), elem));
    }
    for (space, elem) in checked_index_types {
        out.push_str(&format!("WCL_IDX_CHECKER({}, {})\n", ValidatorConfig::address_space_tag(*space), elem));
    }
    out.push('\n');
    out
}

fn render_record(config: &ValidatorConfig, space: AddressSpace, vars: &[RelocatedVar]) -> String {
    let mut out = format!("struct {} {{\n", config.record_type_name(space));
    for v in vars {
        let field = config.relocated_field_name(&v.name);
        out.push_str(&format!("{}{};\n", config.indent(), field_decl_text(&v.ty, &field)));
    }
    out.push_str("};\n");
    out
}

fn render_envelope_record(config: &ValidatorConfig, relocated: &BTreeMap<AddressSpace, Vec<RelocatedVar>>) -> String {
    let mut out = format!("struct {} {{\n", config.envelope_type_name());
    for space in AddressSpace::all() {
        let has_vars = relocated.get(&space).is_some_and(|v| !v.is_empty());
        let record_ty = if has_vars {
            format!("struct {}*", config.record_type_name(space))
        } else {
            "void*".to_string()
        };
        out.push_str(&format!(
            "{}{} {};\n",
            config.indent(),
            record_ty,
            ValidatorConfig::envelope_field_name(space)
        ));
    }
    out.push_str("};\n");
    out
}

/// The field declarator for a relocated variable: an honest fixed array
/// (`int field[4]`) rather than a pointer, so extent stays known to the
/// index checker macro.
fn field_decl_text(ty: &Type, field: &str) -> String {
    match ty {
        Type::Array { elem, size } => format!("{} {field}[{size}]", elem.element_type_name()),
        _ => format!("{} {field}", ty.element_type_name()),
    }
}

const FIXED_MACROS: &str = r#"#define WCL_MIN(a, b) ((a) < (b) ? (a) : (b))
#define WCL_MAX(a, b) ((a) > (b) ? (a) : (b))
#define WCL_CLAMP(lo, x, hi) WCL_MIN(WCL_MAX((x), (lo)), (hi))

#define WCL_PTR_CHECKER(space, type) \
    static inline type *wcl_##space##_##type##_ptr(const void *envelope_ptr, type *p) { \
        const struct wcl_envelope *envelope = (const struct wcl_envelope *)envelope_ptr; \
        unsigned char *lo = (unsigned char *)envelope->space##_space; \
        unsigned char *hi = lo + sizeof(type); \
        unsigned char *addr = (unsigned char *)p; \
        if (lo == (unsigned char *)0 || addr < lo || addr + sizeof(type) > hi) { \
            return (type *)lo; \
        } \
        return p; \
    }

#define WCL_IDX_CHECKER(space, type) \
    static inline long wcl_##space##_##type##_idx(const void *envelope_ptr, const type *base, long i) { \
        const struct wcl_envelope *envelope = (const struct wcl_envelope *)envelope_ptr; \
        (void)base; \
        if (envelope->space##_space == (void *)0) { \
            return 0; \
        } \
        long count = (long)(sizeof(*envelope->space##_space) / sizeof(type)); \
        if (count <= 0) { \
            return 0; \
        } \
        long wrapped = i % count; \
        return wrapped < 0 ? wrapped + count : wrapped; \
    }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_relocated_sets_still_emit_envelope_and_macros() {
        let config = ValidatorConfig::new();
        let relocated = BTreeMap::new();
        let text = render(&config, &relocated, &[], &[]);
        assert!(text.contains("struct wcl_envelope"));
        assert!(text.contains("WCL_PTR_CHECKER"));
        assert!(!text.contains("wcl_private_record"));
    }

    #[test]
    fn populated_space_gets_its_own_record_and_pointer_field() {
        let config = ValidatorConfig::new();
        let mut relocated = BTreeMap::new();
        relocated.insert(
            AddressSpace::Private,
            vec![RelocatedVar {
                name: "x".to_string(),
                ty: Type::scalar("int"),
                init_text: Some("7".to_string()),
            }],
        );
        let text = render(&config, &relocated, &[(AddressSpace::Private, "int".to_string())], &[]);
        assert!(text.contains("struct wcl_private_record"));
        assert!(text.contains("wcl_x"));
        assert!(text.contains("struct wcl_private_record* private_space"));
        assert!(text.contains("WCL_PTR_CHECKER(private, int)"));
    }
}
