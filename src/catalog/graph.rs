use crate::extract::csv_data_source::{CsvDataSource, Separator};
use crate::load::graph::{EdgeSpec, EndpointSpec};
use crate::transform::{Coercion, EntitySchema, FieldSpec};
use std::path::Path;

pub const CUSTOMER_FILE: &str = "Customer/person_0_0.csv";
pub const VENDOR_FILE: &str = "Vendor/Vendor.csv";
pub const PRODUCT_FILE: &str = "Product/Product.csv";
pub const FEEDBACK_FILE: &str = "Feedback/Feedback.csv";
pub const POST_FILE: &str = "SocialNetwork/post_0_0.csv";
pub const TAG_FILE: &str = "SocialNetwork/tag.csv";

pub const VERTEX_CLASSES: &[&str] = &[
    "Customer",
    "Customer_North",
    "Customer_Center",
    "Customer_South",
    "Person",
    "Person_North",
    "Person_Center",
    "Person_South",
    "Vendor",
    "Product",
    "Product_Cheap",
    "Product_Expensive",
    "Feedback",
    "Post",
    "Post_Short",
    "Post_Medium",
    "Post_Long",
    "Tag",
];

pub const EDGE_CLASSES: &[&str] = &[
    "CUSTOMER_KNOWS_PERSON",
    "POST_HAS_CREATOR_PERSON",
    "POST_HAS_TAG",
    "PERSON_HAS_INTEREST_TAG",
];

/// The shared person file, keyed by `key_field` (`CUSTOMER_ID` or `PERSON_ID`).
pub fn person_vertex(class: &str, key_field: &str) -> EntitySchema {
    EntitySchema::new(
        class,
        vec![
            FieldSpec::named("ID", key_field, Coercion::Text),
            FieldSpec::named("FIRSTNAME", "FIRST_NAME", Coercion::Text),
            FieldSpec::named("LASTNAME", "LAST_NAME", Coercion::Text),
            FieldSpec::named("BIRTHDAY", "BIRTHDAY", Coercion::DateTime),
            FieldSpec::named("CREATION_DATE", "CREATE_DATE", Coercion::DateTime),
            FieldSpec::named("PLACE", "PLACE", Coercion::Integer { default: None }),
        ],
    )
    .keeping_rest()
}

pub fn vendor() -> EntitySchema {
    EntitySchema::new(
        "Vendor",
        ["VENDOR_ID", "COMPANY", "COUNTRY", "INDUSTRY"]
            .iter()
            .map(|name| FieldSpec::named(name, name, Coercion::TrimmedText))
            .collect(),
    )
}

pub fn product() -> EntitySchema {
    EntitySchema::new(
        "Product",
        vec![
            FieldSpec::named("PRICE", "PRICE", Coercion::Float),
            FieldSpec::named("VENDOR_ID", "VENDOR_ID", Coercion::TrimmedText),
        ],
    )
    .keeping_rest()
}

pub fn post() -> EntitySchema {
    EntitySchema::new(
        "Post",
        vec![
            FieldSpec::named("CREATE_DATE", "CREATE_DATE", Coercion::DateTime),
            FieldSpec::named("LENGTH", "LENGTH", Coercion::Integer { default: Some(0) }),
        ],
    )
    .keeping_rest()
}

pub fn tag() -> EntitySchema {
    EntitySchema::new(
        "Tag",
        vec![
            FieldSpec::named("ID", "TAG_ID", Coercion::Text),
            FieldSpec::keep("TITLE"),
        ],
    )
}

/// The four edge classes, read from `SocialNetwork/` below `data_dir`.
pub fn edge_specs(data_dir: &Path) -> Vec<EdgeSpec> {
    let source = |file: &str| {
        CsvDataSource::new(data_dir.join("SocialNetwork").join(file), Separator::Pipe)
    };
    vec![
        EdgeSpec::new(
            "CUSTOMER_KNOWS_PERSON",
            source("person_knows_person_0_0.csv"),
            EndpointSpec::new("Customer", "CUSTOMER_ID", "FROM_ID"),
            EndpointSpec::new("Person", "PERSON_ID", "TO_ID"),
        )
        .with_attributes(&["creationDate"]),
        EdgeSpec::new(
            "POST_HAS_CREATOR_PERSON",
            source("post_hasCreator_person_0_0.csv"),
            EndpointSpec::new("Post", "POST_ID", "POST_ID"),
            EndpointSpec::new("Person", "PERSON_ID", "PERSON_ID"),
        ),
        EdgeSpec::new(
            "POST_HAS_TAG",
            source("post_hasTag_tag_0_0.csv"),
            EndpointSpec::new("Post", "POST_ID", "POST_ID"),
            EndpointSpec::new("Tag", "TAG_ID", "TAG_ID"),
        ),
        EdgeSpec::new(
            "PERSON_HAS_INTEREST_TAG",
            source("person_hasInterest_tag_0_0.csv"),
            EndpointSpec::new("Person", "PERSON_ID", "PERSON_ID"),
            EndpointSpec::new("Tag", "TAG_ID", "TAG_ID"),
        ),
    ]
}
