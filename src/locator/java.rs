/// Package name plus every class-like declaration; the locator keeps the
/// top-level ones.
pub(super) const DECLARATION_QUERY: &str = r#"
(package_declaration [(identifier) (scoped_identifier)] @package)
(class_declaration name: (identifier) @name) @definition
(interface_declaration name: (identifier) @name) @definition
(enum_declaration name: (identifier) @name) @definition
(record_declaration name: (identifier) @name) @definition
(annotation_type_declaration name: (identifier) @name) @definition
"#;
