use options::{parse_path, Module, NodeRef, OptionType, SchemaOption};

fn tree() -> Module {
    let magics = Module::new()
        .with("enable", OptionType::Bool)
        .with("port", OptionType::UnsignedInt16);
    let users = OptionType::Submodule(Module::new().with("name", OptionType::Str));
    Module::new()
        .with("services", Module::new().with("magics", magics))
        .with("users", SchemaOption::new(users))
}

#[test]
fn test_resolves_nested_options() {
    let module = tree();
    let port = module.by_path(&["services", "magics", "port"]).expect("port resolves");
    let option = port.as_option().expect("port is an option");
    assert_eq!(option.kind, OptionType::UnsignedInt16);

    let magics = module.by_path(&parse_path("services.magics")).expect("magics resolves");
    let members: Vec<_> = magics.as_module().expect("magics is a module").names().collect();
    assert_eq!(members, vec!["enable", "port"]);
}

#[test]
fn test_empty_path_is_the_module_itself() {
    let module = tree();
    let empty: [&str; 0] = [];
    assert_eq!(module.by_path(&empty), Some(NodeRef::Module(&module)));
}

#[test]
fn test_missing_segments_do_not_resolve() {
    let module = tree();
    assert!(module.by_path(&["services", "nginx"]).is_none());
    assert!(module.by_path(&["nope"]).is_none());
}

#[test]
fn test_cannot_descend_through_a_leaf() {
    let module = tree();
    assert!(module.by_path(&["services", "magics", "port", "deeper"]).is_none());
}

#[test]
fn test_descends_into_submodules() {
    let module = tree();
    let name = module.by_path(&["users", "name"]).expect("resolves through submodule");
    assert_eq!(name.as_option().map(|o| &o.kind), Some(&OptionType::Str));

    let users = module.by_path(&["users"]).expect("users resolves");
    assert!(users.as_option().is_some());
    assert_eq!(users.as_module().map(Module::len), Some(1));
}
