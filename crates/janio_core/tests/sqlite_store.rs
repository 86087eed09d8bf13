use janio_core::db::open_db_in_memory;
use janio_core::{
    CategoryId, Item, ItemDraft, ItemId, ItemStore, Mutation, OrderEntry, SqliteItemStore,
    StoreError,
};
use rusqlite::Connection;

fn item(category: CategoryId, id: &str, order: u32) -> Item {
    ItemDraft {
        id: Some(id.to_string()),
        description: Some(format!("about {id}")),
        ..ItemDraft::titled(id)
    }
    .into_item(category, order)
    .unwrap()
}

fn create(store: &SqliteItemStore<'_>, category: CategoryId, item: &Item) {
    store
        .apply_mutation(&Mutation::Create {
            category,
            item: item.clone(),
        })
        .unwrap();
}

fn entry(id: &str, order: u32) -> OrderEntry {
    OrderEntry {
        id: ItemId::parse(id).unwrap(),
        order,
    }
}

#[test]
fn create_then_list_returns_items_by_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    let second = item(CategoryId::Tasks, "second", 2);
    let first = item(CategoryId::Tasks, "first", 1);
    create(&store, CategoryId::Tasks, &second);
    create(&store, CategoryId::Tasks, &first);

    let listed = store.list_by_category(CategoryId::Tasks).unwrap();
    assert_eq!(listed, vec![first, second]);
    assert!(store.list_by_category(CategoryId::Notes).unwrap().is_empty());
}

#[test]
fn task_due_dates_round_trip_and_notes_have_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    let task = ItemDraft {
        due_date: Some("2026-11-02".to_string()),
        ..ItemDraft::titled("ship")
    }
    .into_item(CategoryId::WorkTasks, 1)
    .unwrap();
    create(&store, CategoryId::WorkTasks, &task);
    create(&store, CategoryId::Notes, &item(CategoryId::Notes, "n", 1));

    let tasks = store.list_by_category(CategoryId::WorkTasks).unwrap();
    assert_eq!(tasks[0].due_date(), Some("2026-11-02"));
    let notes = store.list_by_category(CategoryId::Notes).unwrap();
    assert_eq!(notes[0].due_date(), None);
}

#[test]
fn duplicate_create_is_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    let note = item(CategoryId::Notes, "a", 1);
    create(&store, CategoryId::Notes, &note);

    let err = store
        .apply_mutation(&Mutation::Create {
            category: CategoryId::Notes,
            item: note,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(id) if id.as_str() == "a"));
}

#[test]
fn update_replaces_record_and_missing_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    let mut note = item(CategoryId::Notes, "a", 1);
    create(&store, CategoryId::Notes, &note);

    note.title = "renamed".to_string();
    note.description = String::new();
    store
        .apply_mutation(&Mutation::Update {
            category: CategoryId::Notes,
            item: note.clone(),
        })
        .unwrap();
    assert_eq!(store.list_by_category(CategoryId::Notes).unwrap(), vec![note]);

    let err = store
        .apply_mutation(&Mutation::Update {
            category: CategoryId::Notes,
            item: item(CategoryId::Notes, "ghost", 1),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn writes_are_scoped_to_their_category() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    create(&store, CategoryId::Notes, &item(CategoryId::Notes, "a", 1));

    store
        .apply_mutation(&Mutation::Delete {
            category: CategoryId::Tasks,
            item_id: ItemId::parse("a").unwrap(),
        })
        .unwrap();
    assert_eq!(store.list_by_category(CategoryId::Notes).unwrap().len(), 1);

    let err = store
        .apply_mutation(&Mutation::Update {
            category: CategoryId::Tasks,
            item: item(CategoryId::Tasks, "a", 1),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    create(&store, CategoryId::Notes, &item(CategoryId::Notes, "a", 1));
    let delete = Mutation::Delete {
        category: CategoryId::Notes,
        item_id: ItemId::parse("a").unwrap(),
    };

    store.apply_mutation(&delete).unwrap();
    store.apply_mutation(&delete).unwrap();
    assert!(store.list_by_category(CategoryId::Notes).unwrap().is_empty());
}

#[test]
fn reorder_updates_orders_atomically() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    for (id, order) in [("a", 1), ("b", 2), ("c", 3)] {
        create(&store, CategoryId::Notes, &item(CategoryId::Notes, id, order));
    }

    store
        .apply_mutation(&Mutation::Reorder {
            category: CategoryId::Notes,
            items: vec![entry("c", 1), entry("a", 2), entry("b", 3)],
        })
        .unwrap();
    let orders: Vec<(String, u32)> = store
        .list_by_category(CategoryId::Notes)
        .unwrap()
        .into_iter()
        .map(|item| (item.id.to_string(), item.order))
        .collect();
    assert_eq!(
        orders,
        vec![
            ("c".to_string(), 1),
            ("a".to_string(), 2),
            ("b".to_string(), 3)
        ]
    );

    let err = store
        .apply_mutation(&Mutation::Reorder {
            category: CategoryId::Notes,
            items: vec![entry("a", 1), entry("ghost", 2)],
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id.as_str() == "ghost"));
    let first = &store.list_by_category(CategoryId::Notes).unwrap()[0];
    assert_eq!(first.id.as_str(), "c");
}

#[test]
fn invalid_mutation_is_rejected_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteItemStore::try_new(&conn).unwrap();
    create(&store, CategoryId::Notes, &item(CategoryId::Notes, "a", 1));

    let err = store
        .apply_mutation(&Mutation::Reorder {
            category: CategoryId::Notes,
            items: vec![entry("a", 0)],
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.list_by_category(CategoryId::Notes).unwrap()[0].order, 1);
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let result = SqliteItemStore::try_new(&conn);
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
}
