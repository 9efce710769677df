#![allow(missing_docs)]

use zmeta_plugin::{Plugin, PluginCreateError, RuntimeRegistry};

struct TestPlugin;

// The input is arbitrary, usually codec metadata.
enum Input {
    Accept,
    Reject,
}

fn create_test(input: &Input) -> Result<TestPlugin, PluginCreateError> {
    match input {
        Input::Accept => Ok(TestPlugin),
        Input::Reject => Err(PluginCreateError::from("rejected".to_string())),
    }
}

#[test]
fn plugin() {
    let plugin = Plugin::new("test", create_test);
    assert_eq!(plugin.identifier(), "test");
    assert!(plugin.create(&Input::Accept).is_ok());
    assert!(plugin.create(&Input::Reject).is_err());
}

#[test]
fn plugin_in_registry() {
    let registry = RuntimeRegistry::new();
    registry.register("test", Plugin::new("test", create_test));
    let plugin = registry.get("test").unwrap();
    assert!(plugin.create(&Input::Accept).is_ok());
    assert!(registry.get("other").is_none());
}
