use noderelay::config::InstanceConfig;
use noderelay::registry::{Instance, InstanceRegistry};

fn seed() -> Vec<InstanceConfig> {
    vec![
        InstanceConfig {
            ip: "10.0.0.5".to_string(),
            session: Some("abc123".to_string()),
            alias: Some("master".to_string()),
        },
        InstanceConfig {
            ip: "10.0.0.6".to_string(),
            session: None,
            alias: None,
        },
    ]
}

#[tokio::test]
async fn test_registry_find_by_ip() {
    let registry = InstanceRegistry::new(seed());

    let found = registry.find_by_ip("10.0.0.5").await.unwrap();
    assert_eq!(found.ip, "10.0.0.5");
    assert_eq!(found.alias.as_deref(), Some("master"));

    assert!(registry.find_by_ip("10.0.0.99").await.is_none());
}

#[tokio::test]
async fn test_registry_find_by_alias() {
    let registry = InstanceRegistry::new(seed());

    let found = registry.find_by_alias("abc123", "master").await.unwrap();
    assert_eq!(found.ip, "10.0.0.5");
}

#[tokio::test]
async fn test_registry_find_by_alias_requires_both_parts() {
    let registry = InstanceRegistry::new(seed());

    assert!(registry.find_by_alias("abc123", "worker").await.is_none());
    assert!(registry.find_by_alias("other", "master").await.is_none());
    // An instance without alias metadata never matches an alias lookup
    assert!(registry.find_by_alias("", "").await.is_none());
}

#[tokio::test]
async fn test_registry_register_and_remove() {
    let registry = InstanceRegistry::new(vec![]);
    assert_eq!(registry.count().await, 0);

    registry
        .register(Instance {
            ip: "192.168.1.7".to_string(),
            session: Some("s1".to_string()),
            alias: Some("db".to_string()),
        })
        .await;

    assert_eq!(registry.count().await, 1);
    assert!(registry.find_by_ip("192.168.1.7").await.is_some());

    assert!(registry.remove_by_ip("192.168.1.7").await);
    assert!(!registry.remove_by_ip("192.168.1.7").await);
    assert!(registry.find_by_ip("192.168.1.7").await.is_none());
}
