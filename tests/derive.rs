//! Tests for `#[derive(Injectable)]` and `#[module]`

use std::sync::Arc;
use wireup::prelude::*;

trait UserRepository: Send + Sync {
    fn find(&self, id: u32) -> Option<String>;
}

trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> String;
}

#[derive(Injectable)]
struct InMemoryUserRepository {}

impl UserRepository for InMemoryUserRepository {
    fn find(&self, id: u32) -> Option<String> {
        (id == 1).then(|| "studyzy".to_string())
    }
}

#[derive(Injectable)]
#[inject(name = "email")]
struct EmailNotifier {}

impl Notifier for EmailNotifier {
    fn notify(&self, message: &str) -> String {
        format!("email: {}", message)
    }
}

#[derive(Injectable)]
#[inject(name = "sms")]
struct SmsNotifier {}

impl Notifier for SmsNotifier {
    fn notify(&self, message: &str) -> String {
        format!("sms: {}", message)
    }
}

#[derive(Injectable)]
struct UserService {
    repository: Arc<dyn UserRepository>,
    #[inject(name = "sms")]
    notifier: Arc<dyn Notifier>,
    #[inject(optional)]
    audit: Option<Arc<AuditTrail>>,
}

impl UserService {
    fn greet(&self, id: u32) -> String {
        let name = self.repository.find(id).unwrap_or_default();
        self.notifier.notify(&format!("hello {}", name))
    }
}

struct AuditTrail;

#[derive(Injectable)]
#[inject(transient)]
struct RequestContext {
    service: Arc<UserService>,
}

#[module(
    providers = [InMemoryUserRepository],
    bindings = [(dyn UserRepository => InMemoryUserRepository)],
)]
struct RepositoryModule;

#[module(
    providers = [EmailNotifier, SmsNotifier],
    bindings = [
        (dyn Notifier => EmailNotifier),
        (dyn Notifier => SmsNotifier),
    ],
)]
struct NotifierModule;

#[module(
    imports = [RepositoryModule, NotifierModule],
    providers = [UserService, RequestContext],
)]
struct AppModule;

#[test]
fn test_module_wires_the_graph() {
    let container = AppModule::create_container().unwrap();

    let service = container.resolve::<Arc<UserService>>().unwrap();
    assert_eq!(service.greet(1), "sms: hello studyzy");
    assert!(service.audit.is_none());
}

#[test]
fn test_binding_shares_instance_with_provider() {
    let container = AppModule::create_container().unwrap();

    let concrete = container.resolve::<Arc<InMemoryUserRepository>>().unwrap();
    let via_trait = container.resolve::<Arc<dyn UserRepository>>().unwrap();
    assert!(std::ptr::addr_eq(
        Arc::as_ptr(&concrete),
        Arc::as_ptr(&via_trait)
    ));
}

#[test]
fn test_named_bindings() {
    let container = AppModule::create_container().unwrap();

    let email = container
        .resolve_named::<Arc<dyn Notifier>>("email")
        .unwrap();
    assert_eq!(email.notify("hi"), "email: hi");
    assert!(container.resolve::<Arc<dyn Notifier>>().err().unwrap().is_not_found());
}

#[test]
fn test_transient_attribute() {
    let container = AppModule::create_container().unwrap();

    let first = container.resolve::<Arc<RequestContext>>().unwrap();
    let second = container.resolve::<Arc<RequestContext>>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.service, &second.service));
}

#[test]
fn test_optional_field_is_filled_when_registered() {
    let container = Container::new();
    container.install::<RepositoryModule>().unwrap();
    container.install::<NotifierModule>().unwrap();
    container.register_instance(Arc::new(AuditTrail)).unwrap();
    container.register_injectable::<UserService>().unwrap();

    let service = container.resolve::<Arc<UserService>>().unwrap();
    assert!(service.audit.is_some());
}

#[test]
fn test_injectable_builder_can_be_refined() {
    let container = Container::new();
    container.install::<RepositoryModule>().unwrap();
    container.install::<NotifierModule>().unwrap();

    <UserService as wireup::Injectable>::provide(&container)
        .named("primary")
        .register()
        .unwrap();

    assert!(container.contains_named::<Arc<UserService>>("primary"));
    assert!(!container.contains::<Arc<UserService>>());
    let service = container
        .resolve_named::<Arc<UserService>>("primary")
        .unwrap();
    assert_eq!(service.greet(2), "sms: hello ");
}

#[test]
fn test_missing_import_is_reported() {
    let container = Container::new();
    container.install::<NotifierModule>().unwrap();
    container.register_injectable::<UserService>().unwrap();

    let err = container.resolve::<Arc<UserService>>().err().unwrap();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("UserRepository"));
}

#[test]
fn test_container_builder_with_modules() {
    let container = ContainerBuilder::new()
        .module::<RepositoryModule>()
        .module::<NotifierModule>()
        .build()
        .unwrap();
    container.register_injectable::<UserService>().unwrap();

    let service = container.resolve::<Arc<UserService>>().unwrap();
    assert_eq!(service.greet(1), "sms: hello studyzy");
    // four providers, three bindings
    assert_eq!(container.len(), 7);
}

#[derive(Injectable)]
struct Clock {}

#[module(providers = [Clock])]
struct ClockModule;

#[module(imports = [ClockModule], providers = [InMemoryUserRepository])]
struct StorageModule;

#[module(imports = [ClockModule], providers = [SmsNotifier])]
struct MessagingModule;

#[module(imports = [StorageModule, MessagingModule])]
struct PlatformModule;

#[test]
fn test_shared_import_registers_once() {
    let container = PlatformModule::create_container().unwrap();

    assert!(container.resolve::<Arc<Clock>>().is_ok());
    // one provider each for Clock, InMemoryUserRepository and SmsNotifier
    assert_eq!(container.len(), 3);
}

#[test]
fn test_installing_module_twice_is_a_no_op() {
    let container = Container::new();
    container.install::<RepositoryModule>().unwrap();
    container.install::<RepositoryModule>().unwrap();

    assert_eq!(container.len(), 2);
    let repository = container.resolve::<Arc<dyn UserRepository>>().unwrap();
    assert_eq!(repository.find(1).as_deref(), Some("studyzy"));
}

#[test]
fn test_reset_forgets_installed_modules() {
    let container = RepositoryModule::create_container().unwrap();
    container.reset();
    assert!(container.is_empty());

    container.install::<RepositoryModule>().unwrap();
    assert!(container.resolve::<Arc<dyn UserRepository>>().is_ok());
}
