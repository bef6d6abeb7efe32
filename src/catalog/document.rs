use crate::transform::{Coercion, EntitySchema, FieldSpec, KeySpec};

pub const CUSTOMER_FILE: &str = "person_0_0.csv";
pub const FEEDBACK_FILE: &str = "Feedback.csv";
pub const INVOICE_FILE: &str = "Invoice.xml";
pub const TAG_FILE: &str = "Tag.csv";
pub const VENDOR_FILE: &str = "Vendor.csv";
pub const ORDER_FILE: &str = "Order.json";
pub const PRODUCT_FILE: &str = "Product.csv";
pub const POST_FILE: &str = "post_0_0.csv";

/// A relation file turned into `_from`/`_to` documents.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationPlan {
    pub file: &'static str,
    pub collection: &'static str,
    pub from_prefix: &'static str,
    pub to_prefix: &'static str,
    /// Dropped, when present, before the two-column check.
    pub drop_columns: &'static [&'static str],
}

impl RelationPlan {
    pub fn schema(&self) -> EntitySchema {
        EntitySchema::new(
            self.collection,
            vec![
                FieldSpec::positional(0, "_from", Coercion::Prefixed(self.from_prefix.to_string())),
                FieldSpec::positional(1, "_to", Coercion::Prefixed(self.to_prefix.to_string())),
            ],
        )
        .with_expected_width(2)
    }
}

pub const RELATIONS: &[RelationPlan] = &[
    RelationPlan {
        file: "person_knows_person_0_0.csv",
        collection: "CustomerKnowsPerson",
        from_prefix: "Customer/",
        to_prefix: "Person/",
        drop_columns: &["creationDate"],
    },
    RelationPlan {
        file: "person_hasInterest_tag_0_0.csv",
        collection: "PersonHasInterestTag",
        from_prefix: "Person/",
        to_prefix: "Tag/",
        drop_columns: &[],
    },
    RelationPlan {
        file: "post_hasCreator_person_0_0.csv",
        collection: "PostHasCreatorPerson",
        from_prefix: "Post/",
        to_prefix: "Person/",
        drop_columns: &[],
    },
    RelationPlan {
        file: "post_hasTag_tag_0_0.csv",
        collection: "PostHasTag",
        from_prefix: "Post/",
        to_prefix: "Tag/",
        drop_columns: &[],
    },
];

/// Every collection a run writes to, in the order they are cleared.
pub const COLLECTIONS: &[&str] = &[
    "Customer_North",
    "Customer_Center",
    "Customer_South",
    "Customer",
    "Person",
    "Feedback",
    "Invoice",
    "Tag",
    "Vendor",
    "Order",
    "Order_Pre_Pandemic",
    "Order_Post_Pandemic",
    "Post",
    "Post_Short",
    "Post_Medium",
    "Post_Long",
    "Product",
    "Product_Cheap",
    "Product_Expensive",
    "CustomerKnowsPerson",
    "PersonHasInterestTag",
    "PostHasCreatorPerson",
    "PostHasTag",
];

/// Person rows keyed by `id`, with a numeric `place`.
pub fn customer() -> EntitySchema {
    EntitySchema::new(
        "Customer",
        vec![FieldSpec::named("place", "place", Coercion::Integer { default: None })],
    )
    .with_key(KeySpec::Field("id".to_string()))
    .keeping_rest()
}

pub fn person() -> EntitySchema {
    EntitySchema::new("Person", vec![])
        .with_key(KeySpec::Field("id".to_string()))
        .keeping_rest()
}

pub fn feedback() -> EntitySchema {
    EntitySchema::new(
        "Feedback",
        vec![
            FieldSpec::positional(0, "productId", Coercion::Text),
            FieldSpec::positional(1, "personId", Coercion::Text),
            FieldSpec::positional(2, "review", Coercion::StripChars('\'')),
        ],
    )
    .with_expected_width(3)
    .with_key(KeySpec::Composite {
        fields: vec!["productId".to_string(), "personId".to_string()],
        separator: "_".to_string(),
    })
}

pub fn tag() -> EntitySchema {
    EntitySchema::new(
        "Tag",
        vec![
            FieldSpec::positional(0, "_key", Coercion::Text),
            FieldSpec::positional(1, "title", Coercion::Text),
        ],
    )
    .with_expected_width(2)
}

pub fn vendor() -> EntitySchema {
    EntitySchema::new(
        "Vendor",
        vec![
            FieldSpec::positional(0, "_key", Coercion::Text),
            FieldSpec::positional(1, "country", Coercion::Text),
            FieldSpec::positional(2, "industry", Coercion::Text),
        ],
    )
    .with_expected_width(3)
}

pub fn product() -> EntitySchema {
    EntitySchema::new(
        "Product",
        vec![FieldSpec::named("price", "price", Coercion::Float)],
    )
    .keeping_rest()
}

pub fn post() -> EntitySchema {
    EntitySchema::new(
        "Post",
        vec![
            FieldSpec::positional(0, "_key", Coercion::Text),
            FieldSpec::positional(1, "imageFile", Coercion::FillMissing(String::new())),
            FieldSpec::positional(2, "createDate", Coercion::Text),
            FieldSpec::positional(3, "location", Coercion::Text),
            FieldSpec::positional(4, "browserUsed", Coercion::Text),
            FieldSpec::positional(5, "language", Coercion::FillMissing("unknown".to_string())),
            FieldSpec::positional(6, "content", Coercion::FillMissing(String::new())),
            FieldSpec::positional(7, "length", Coercion::Integer { default: Some(0) }),
        ],
    )
    .with_expected_width(8)
}
