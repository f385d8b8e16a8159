use std::sync::{Arc, Barrier};
use std::thread;

use annotations::{
    Annotation, AnnotationRegistry, AnnotationType, AnnotationTypeId, AttributeName,
    AttributeType, AttributeValue, CachedAttribute, RepeatableContainers, ResolutionContext,
    SynthesizedAnnotation,
};

const THREADS: usize = 8;
const ROUNDS: usize = 50;

fn id(name: &str) -> AnnotationTypeId {
    AnnotationTypeId::new(name).expect("test id is non-empty")
}

fn registry() -> Arc<AnnotationRegistry> {
    Arc::new(
        AnnotationRegistry::new([
            AnnotationType::new(id("com.example.Role"))
                .with_attribute(AttributeName::value(), AttributeType::String)
                .repeatable_in(id("com.example.Roles")),
            AnnotationType::new(id("com.example.Roles")).with_attribute(
                AttributeName::value(),
                AttributeType::annotation_array(id("com.example.Role")),
            ),
        ])
        .expect("registry builds"),
    )
}

fn roles(count: usize) -> SynthesizedAnnotation {
    let elements = (0..count)
        .map(|index| {
            let role: Arc<dyn Annotation> = Arc::new(
                SynthesizedAnnotation::new(id("com.example.Role")).with_attribute(
                    AttributeName::value(),
                    AttributeValue::String(format!("role-{index}")),
                ),
            );
            AttributeValue::Annotation(role)
        })
        .collect();
    SynthesizedAnnotation::new(id("com.example.Roles"))
        .with_attribute(AttributeName::value(), AttributeValue::Array(elements))
}

#[test]
fn concurrent_resolution_converges_on_one_entry_per_type() {
    let context = ResolutionContext::new(registry());
    let chain = RepeatableContainers::standard_repeatables();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let context = context.clone();
            let chain = chain.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let container = roles(worker + 1);
                let plain = SynthesizedAnnotation::new(id("com.example.Role")).with_attribute(
                    AttributeName::value(),
                    AttributeValue::String("solo".to_string()),
                );
                barrier.wait();
                for _ in 0..ROUNDS {
                    let repeated = chain
                        .find_repeated_annotations(&container, &context)
                        .expect("resolution succeeds")
                        .expect("roles is a container");
                    assert_eq!(repeated.len(), worker + 1);

                    let none = chain
                        .find_repeated_annotations(&plain, &context)
                        .expect("resolution succeeds");
                    assert!(none.is_none());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread completes");
    }

    assert_eq!(context.cache().len(), 2);
    assert!(matches!(
        context.cache().get(&id("com.example.Roles")),
        Some(CachedAttribute::Eligible(_))
    ));
    assert_eq!(
        context.cache().get(&id("com.example.Role")),
        Some(CachedAttribute::NotApplicable)
    );
}

#[test]
fn separate_contexts_do_not_share_cache_entries() {
    let registry = registry();
    let first = ResolutionContext::new(registry.clone());
    let second = ResolutionContext::new(registry);

    RepeatableContainers::standard_repeatables()
        .find_repeated_annotations(&roles(2), &first)
        .expect("resolution succeeds");

    assert_eq!(first.cache().len(), 1);
    assert!(second.cache().is_empty());
}
