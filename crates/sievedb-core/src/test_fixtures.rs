//! Shared test schema and seeded datasource.
//!
//! A small publishing domain exercising every attribute shape: plain
//! columns, a to-one relation (`computer.owner`), a to-many relation
//! (`person.computers`, `article.tagged`), and an association proxy
//! (`article.tags` via `tagged` to `tag`).

use crate::{
    db::memory::MemoryDatasource,
    model::{
        ColumnType, EntityModel, FieldKind, FieldModel, ProxyModel, RelationCardinality,
        RelationModel, SchemaRegistry,
    },
    value::Value,
};
use chrono::{NaiveDate, NaiveTime, TimeDelta};

pub(crate) static PERSON: EntityModel = EntityModel {
    entity_name: "person",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Column(ColumnType::Text),
        },
        FieldModel {
            name: "age",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "other",
            kind: FieldKind::Column(ColumnType::Float),
        },
        FieldModel {
            name: "birth_date",
            kind: FieldKind::Column(ColumnType::Date),
        },
        FieldModel {
            name: "computers",
            kind: FieldKind::Relation(RelationModel {
                target: "computer",
                cardinality: RelationCardinality::ToMany,
            }),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) static COMPUTER: EntityModel = EntityModel {
    entity_name: "computer",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Column(ColumnType::Text),
        },
        FieldModel {
            name: "vendor",
            kind: FieldKind::Column(ColumnType::Text),
        },
        FieldModel {
            name: "buy_date",
            kind: FieldKind::Column(ColumnType::DateTime),
        },
        FieldModel {
            name: "owner",
            kind: FieldKind::Relation(RelationModel {
                target: "person",
                cardinality: RelationCardinality::ToOne,
            }),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) static ARTICLE: EntityModel = EntityModel {
    entity_name: "article",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "title",
            kind: FieldKind::Column(ColumnType::Text),
        },
        FieldModel {
            name: "author",
            kind: FieldKind::Relation(RelationModel {
                target: "person",
                cardinality: RelationCardinality::ToOne,
            }),
        },
        FieldModel {
            name: "tagged",
            kind: FieldKind::Relation(RelationModel {
                target: "article_tag",
                cardinality: RelationCardinality::ToMany,
            }),
        },
        FieldModel {
            name: "tags",
            kind: FieldKind::Proxy(ProxyModel {
                via: "tagged",
                remote: "tag",
            }),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) static ARTICLE_TAG: EntityModel = EntityModel {
    entity_name: "article_tag",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "article",
            kind: FieldKind::Relation(RelationModel {
                target: "article",
                cardinality: RelationCardinality::ToOne,
            }),
        },
        FieldModel {
            name: "tag",
            kind: FieldKind::Relation(RelationModel {
                target: "tag",
                cardinality: RelationCardinality::ToOne,
            }),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) static TAG: EntityModel = EntityModel {
    entity_name: "tag",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Column(ColumnType::Text),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) static SATELLITE: EntityModel = EntityModel {
    entity_name: "satellite",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Column(ColumnType::Integer),
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Column(ColumnType::Text),
        },
        FieldModel {
            name: "period",
            kind: FieldKind::Column(ColumnType::Duration),
        },
    ],
    primary_keys: &["id"],
};

pub(crate) fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    for model in [&PERSON, &COMPUTER, &ARTICLE, &ARTICLE_TAG, &TAG, &SATELLITE] {
        registry
            .register(model)
            .expect("fixture schema registers cleanly");
    }

    registry
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn datetime(y: i32, m: u32, d: u32) -> Value {
    Value::DateTime(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN),
    )
}

/// Seeded datasource. Row comments give the shapes tests rely on.
pub(crate) fn datasource() -> MemoryDatasource {
    let mut ds = MemoryDatasource::new();

    // People: Mary and John have age == other; Lucy has no birth date.
    let mary = ds.insert(
        "person",
        [
            ("id", Value::Int(1)),
            ("name", Value::Text("Mary".into())),
            ("age", Value::Int(19)),
            ("other", Value::Float(19.0)),
            ("birth_date", date(1900, 1, 2)),
        ],
    );
    let lucy = ds.insert(
        "person",
        [
            ("id", Value::Int(2)),
            ("name", Value::Text("Lucy".into())),
            ("age", Value::Int(23)),
            ("other", Value::Float(23.0)),
            ("birth_date", Value::Null),
        ],
    );
    let _katy = ds.insert(
        "person",
        [
            ("id", Value::Int(3)),
            ("name", Value::Text("Katy".into())),
            ("age", Value::Int(7)),
            ("other", Value::Float(9.0)),
            ("birth_date", date(1985, 6, 17)),
        ],
    );
    let john = ds.insert(
        "person",
        [
            ("id", Value::Int(4)),
            ("name", Value::Text("John".into())),
            ("age", Value::Int(28)),
            ("other", Value::Float(28.0)),
            ("birth_date", date(1960, 3, 5)),
        ],
    );
    let _lincoln = ds.insert(
        "person",
        [
            ("id", Value::Int(5)),
            ("name", Value::Text("Lincoln".into())),
            ("age", Value::Int(25)),
            ("other", Value::Float(5.0)),
            ("birth_date", date(1920, 11, 10)),
        ],
    );

    // Computers: "spare" has no owner, so owner-joins drop it.
    let imac = ds.insert(
        "computer",
        [
            ("id", Value::Int(1)),
            ("name", Value::Text("imac".into())),
            ("vendor", Value::Text("Apple".into())),
            ("buy_date", datetime(2005, 4, 6)),
        ],
    );
    let thinkpad = ds.insert(
        "computer",
        [
            ("id", Value::Int(2)),
            ("name", Value::Text("thinkpad".into())),
            ("vendor", Value::Text("Lenovo".into())),
            ("buy_date", datetime(2015, 7, 21)),
        ],
    );
    let latitude = ds.insert(
        "computer",
        [
            ("id", Value::Int(3)),
            ("name", Value::Text("latitude".into())),
            ("vendor", Value::Text("Dell".into())),
            ("buy_date", datetime(2011, 2, 10)),
        ],
    );
    let _spare = ds.insert(
        "computer",
        [
            ("id", Value::Int(4)),
            ("name", Value::Text("spare".into())),
            ("vendor", Value::Text("Dell".into())),
            ("buy_date", Value::Null),
        ],
    );

    ds.link("computer", imac, "owner", mary);
    ds.link("computer", thinkpad, "owner", lucy);
    ds.link("computer", latitude, "owner", lucy);
    ds.link("person", mary, "computers", imac);
    ds.link("person", lucy, "computers", thinkpad);
    ds.link("person", lucy, "computers", latitude);

    // Articles and tags, through the article_tag indirection.
    let rust_ships = ds.insert(
        "article",
        [
            ("id", Value::Int(1)),
            ("title", Value::Text("rust ships".into())),
        ],
    );
    let cooking = ds.insert(
        "article",
        [
            ("id", Value::Int(2)),
            ("title", Value::Text("cooking again".into())),
        ],
    );
    let news = ds.insert("tag", [("id", Value::Int(1)), ("name", Value::Text("news".into()))]);
    let tech = ds.insert("tag", [("id", Value::Int(2)), ("name", Value::Text("tech".into()))]);
    let food = ds.insert("tag", [("id", Value::Int(3)), ("name", Value::Text("food".into()))]);

    let at_news = ds.insert("article_tag", [("id", Value::Int(1))]);
    let at_tech = ds.insert("article_tag", [("id", Value::Int(2))]);
    let at_food = ds.insert("article_tag", [("id", Value::Int(3))]);

    ds.link("article", rust_ships, "author", john);
    ds.link("article", cooking, "author", mary);
    ds.link("article", rust_ships, "tagged", at_news);
    ds.link("article", rust_ships, "tagged", at_tech);
    ds.link("article", cooking, "tagged", at_food);
    ds.link("article_tag", at_news, "article", rust_ships);
    ds.link("article_tag", at_news, "tag", news);
    ds.link("article_tag", at_tech, "article", rust_ships);
    ds.link("article_tag", at_tech, "tag", tech);
    ds.link("article_tag", at_food, "article", cooking);
    ds.link("article_tag", at_food, "tag", food);

    // Satellites: one period, one null period.
    ds.insert(
        "satellite",
        [
            ("id", Value::Int(1)),
            ("name", Value::Text("iss".into())),
            ("period", Value::Duration(TimeDelta::seconds(5520))),
        ],
    );
    ds.insert(
        "satellite",
        [
            ("id", Value::Int(2)),
            ("name", Value::Text("sputnik".into())),
            ("period", Value::Null),
        ],
    );

    ds
}
