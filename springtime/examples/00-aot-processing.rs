use springtime::config::Settings;
use springtime::processor::ContextAotProcessor;
use springtime_aot::context::GenericApplicationContext;
use springtime_aot::generate::class_name::ClassName;
use springtime_di::bean_definition::{BeanDefinition, PropertyValue, ProxyMode};
use springtime_di::bean_factory::internal::submit;
use springtime_di::bean_factory::{BeanDefinitionRegisterer, DefaultBeanFactory, RegisteredBean};
use springtime_di::error::ErrorPtr;
use std::sync::Arc;

fn register_repository() -> RegisteredBean {
    RegisteredBean::new(
        "order_repository",
        BeanDefinition::new("shop::OrderRepository")
            .with_instance_supplier("shop::OrderRepository::connect"),
    )
    .with_alias("repository")
}

fn register_service() -> RegisteredBean {
    RegisteredBean::new(
        "order_service",
        BeanDefinition::new("shop::OrderService")
            .with_primary(true)
            .with_property_value(PropertyValue::bean_reference("repository", "repository"))
            .with_proxy_mode(ProxyMode::Subclass),
    )
}

// beans are discovered at runtime, which is what the generated code replaces
submit! {
    BeanDefinitionRegisterer {
        register: register_repository
    }
}

submit! {
    BeanDefinitionRegisterer {
        register: register_service
    }
}

fn prepare_context(_: &ClassName) -> Result<GenericApplicationContext, ErrorPtr> {
    DefaultBeanFactory::from_registered_beans(false)
        .map(GenericApplicationContext::new)
        .map_err(|error| Arc::new(error) as ErrorPtr)
}

fn main() {
    // settings can also be loaded with Settings::init_from_environment()
    let settings = Settings::builder()
        .with_source_output("target/aot/sources")
        .with_resource_output("target/aot/resources")
        .with_class_output("target/aot/classes")
        .with_group_id("com.example")
        .with_artifact_id("shop")
        .build()
        .expect("invalid settings");

    let processor = ContextAotProcessor::new("shop::ShopApplication", settings, prepare_context)
        .expect("invalid application type");

    let entry_point = processor.process().expect("AOT processing failed");
    println!("Generated entry point: {}", entry_point);
}
