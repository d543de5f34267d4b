//! Shared fixtures for the integration test suite
//!
//! Builders for the object graphs the scenario tests compare. Kept here
//! so the tests read as scenarios, not as graph plumbing.

use likeness_core::{Member, ObjectBuilder, ObjectHandle, Value, Visibility};

/// A flat person object: `{ Age, Name }`
pub fn person(age: i64, name: &str) -> Value {
    Value::Object(
        ObjectBuilder::new("Person")
            .property("Age", age)
            .property("Name", name)
            .build(),
    )
}

/// A person with a nested address object
pub fn person_with_home(age: i64, name: &str, city: Option<&str>) -> Value {
    let home = match city {
        Some(city) => Value::Object(
            ObjectBuilder::new("Address")
                .property("City", city)
                .property("Zip", "10115")
                .build(),
        ),
        None => Value::Null,
    };
    Value::Object(
        ObjectBuilder::new("Person")
            .property("Age", age)
            .property("Name", name)
            .property("Home", home)
            .build(),
    )
}

/// A record-flavored single-member object: `Note { Text }`
pub fn note(text: &str) -> Value {
    Value::Object(
        ObjectBuilder::new("Note")
            .record()
            .property("Text", text)
            .build(),
    )
}

/// A self-referential linked node of the given type
pub fn cyclic_node(type_name: &str) -> ObjectHandle {
    let node = ObjectHandle::new(type_name);
    node.push_member(Member::property("Value", Value::Int(1)));
    node.push_member(Member::property("Next", Value::Object(node.clone())));
    node
}

/// An object with only non-public members, for accessibility scenarios
pub fn internal_only(value: i64) -> Value {
    Value::Object(
        ObjectBuilder::new("Opaque")
            .member(
                Member::property("Inner", Value::Int(value.into())).with_visibility(Visibility::Internal),
            )
            .build(),
    )
}
