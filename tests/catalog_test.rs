use anyhow::Result;
use rusqlite::Connection;
use workout_schedule_lib::{
    Config, Exercise, ExerciseCatalog, Schedule, SqliteCatalog, Weekday, WorkoutEntry, MAX_SETS,
};

fn create_test_catalog() -> Result<SqliteCatalog> {
    let catalog = SqliteCatalog::new(Connection::open_in_memory()?)?;
    catalog.seed_if_empty()?;
    Ok(catalog)
}

fn names(exercises: &[Exercise]) -> Vec<&str> {
    exercises.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_seed_only_runs_on_empty_catalog() -> Result<()> {
    let catalog = SqliteCatalog::new(Connection::open_in_memory()?)?;
    assert!(catalog.is_empty()?);
    let imported = catalog.seed_if_empty()?;
    assert!(imported > 0);
    assert_eq!(catalog.len()?, imported);
    assert_eq!(catalog.seed_if_empty()?, 0);
    Ok(())
}

#[test]
fn test_lookup_is_case_insensitive_and_keeps_lists() -> Result<()> {
    let catalog = create_test_catalog()?;
    let press = catalog
        .lookup_by_name("  barbell bench press - medium grip ")?
        .expect("bench press is bundled");
    assert_eq!(press.name, "Barbell Bench Press - Medium Grip");
    assert_eq!(press.equipment.as_deref(), Some("barbell"));
    assert_eq!(press.primary_muscles, vec!["chest"]);
    assert_eq!(press.secondary_muscles, vec!["shoulders", "triceps"]);
    assert_eq!(press.instructions.len(), 3);

    let stretch = catalog
        .lookup_by_name("Hamstring Stretch")?
        .expect("stretch is bundled");
    assert_eq!(stretch.equipment, None);
    assert!(stretch.secondary_muscles.is_empty());

    assert!(catalog.lookup_by_name("Moon Walk")?.is_none());
    Ok(())
}

#[test]
fn test_search_ranks_name_prefix_first() -> Result<()> {
    let catalog = create_test_catalog()?;
    let results = catalog.search("barbell")?;
    let found = names(&results);
    // Name-prefix matches, then equipment-only matches, each alphabetical
    assert_eq!(
        &found[..4],
        &[
            "Barbell Bench Press - Medium Grip",
            "Barbell Curl",
            "Barbell Deadlift",
            "Barbell Squat"
        ]
    );
    assert!(found.contains(&"Romanian Deadlift"));
    assert!(found.contains(&"Standing Military Press"));
    Ok(())
}

#[test]
fn test_search_requires_every_keyword() -> Result<()> {
    let catalog = create_test_catalog()?;
    let results = catalog.search("dumbbell CHEST")?;
    assert_eq!(names(&results), vec!["Incline Dumbbell Press"]);

    let results = catalog.search("stretching back")?;
    assert_eq!(names(&results), vec!["Cat Stretch"]);
    Ok(())
}

#[test]
fn test_search_blank_and_wildcards_match_nothing() -> Result<()> {
    let catalog = create_test_catalog()?;
    assert!(catalog.search("")?.is_empty());
    assert!(catalog.search("   ")?.is_empty());
    assert!(catalog.search("%")?.is_empty());
    assert!(catalog.search("_")?.is_empty());
    Ok(())
}

#[test]
fn test_import_replaces_same_name() -> Result<()> {
    let catalog = create_test_catalog()?;
    let before = catalog.len()?;
    let written = catalog.import_json(
        r#"[
            {"name": "pushups", "category": "strength", "level": "expert",
             "equipment": "body only", "primaryMuscles": ["chest"]},
            {"name": "Archer Pushups", "category": "strength", "level": "expert",
             "primaryMuscles": ["chest"], "secondaryMuscles": ["triceps"]},
            {"name": "   "}
        ]"#,
    )?;
    assert_eq!(written, 2);
    assert_eq!(catalog.len()?, before + 1);

    let pushups = catalog.lookup_by_name("Pushups")?.expect("still present");
    assert_eq!(pushups.level, "expert");
    assert!(pushups.instructions.is_empty());
    Ok(())
}

#[test]
fn test_import_rejects_malformed_json() -> Result<()> {
    let catalog = create_test_catalog()?;
    let before = catalog.len()?;
    assert!(catalog.import_json("{\"name\": \"not a list\"}").is_err());
    assert_eq!(catalog.len()?, before);
    Ok(())
}

#[test]
fn test_weekday_labels() {
    assert_eq!(Weekday::from_label("Monday"), Some(Weekday::Monday));
    assert_eq!(Weekday::from_label("Monday (leg day)"), Some(Weekday::Monday));
    assert_eq!(Weekday::from_label("sunday (rest)"), Some(Weekday::Sunday));
    assert_eq!(Weekday::from_label("Funday"), None);
    assert_eq!(Weekday::Friday.label(Some("arms")), "Friday (arms)");
    assert_eq!(Weekday::Friday.label(Some("  ")), "Friday");
    assert_eq!(Weekday::Friday.label(None), "Friday");
    assert_eq!(Weekday::from(chrono::Weekday::Wed), Weekday::Wednesday);
}

#[test]
fn test_with_sets_resizes_reps() {
    let entry = WorkoutEntry::new(1, Exercise::default());
    let entry = entry.with_sets(2);
    assert_eq!(entry.reps, Some(vec![0, 0]));

    let mut entry = entry;
    entry.reps = Some(vec![12, 10]);
    let grown = entry.clone().with_sets(4);
    assert_eq!(grown.sets, Some(4));
    assert_eq!(grown.reps, Some(vec![12, 10, 10, 10]));
    let shrunk = entry.with_sets(1);
    assert_eq!(shrunk.reps, Some(vec![12]));
    assert!(!shrunk.reps_mismatch());
}

#[test]
fn test_with_sets_clamps_huge_counts() {
    let entry = WorkoutEntry::new(1, Exercise::default()).with_sets(4_000_000_000);
    assert_eq!(entry.sets, Some(MAX_SETS));
    assert_eq!(entry.reps.as_ref().map(Vec::len), Some(MAX_SETS as usize));
    assert!(!entry.reps_mismatch());
}

#[test]
fn test_import_keeps_list_items_with_separators() -> Result<()> {
    let catalog = create_test_catalog()?;
    catalog.import_json(
        r#"[
            {"name": "Turkish Get-Up", "category": "strength", "level": "intermediate",
             "equipment": "kettlebells",
             "primaryMuscles": ["shoulders, front"],
             "secondaryMuscles": ["abdominals", "glutes"],
             "instructions": ["Lie on your back.\nHold the bell overhead.", "Stand up slowly."]}
        ]"#,
    )?;
    let getup = catalog.lookup_by_name("turkish get-up")?.expect("just imported");
    assert_eq!(getup.primary_muscles, vec!["shoulders, front"]);
    assert_eq!(getup.secondary_muscles, vec!["abdominals", "glutes"]);
    assert_eq!(
        getup.instructions,
        vec!["Lie on your back.\nHold the bell overhead.", "Stand up slowly."]
    );
    Ok(())
}

#[test]
fn test_blob_round_trip_keeps_optional_fields() -> Result<()> {
    let catalog = create_test_catalog()?;
    let squat = catalog.lookup_by_name("Barbell Squat")?.expect("bundled");
    let plank = catalog.lookup_by_name("Plank")?.expect("bundled");

    let mut schedule = Schedule::empty();
    let mut first = WorkoutEntry::new(7, squat).with_sets(3);
    first.reps = Some(vec![5, 5, 3]);
    first.is_done = true;
    let mut second = WorkoutEntry::new(2, plank);
    second.duration_secs = Some(45);
    schedule.day_mut(Weekday::Thursday).push(first);
    schedule.day_mut(Weekday::Thursday).push(second);

    let blob = schedule.to_blob()?;
    assert_eq!(Schedule::from_blob(&blob)?, schedule);
    Ok(())
}

#[test]
fn test_blob_decoding_is_tolerant() -> Result<()> {
    let blob = r#"{
        "Monday": [{"id": 1, "exercise": {"name": "A"}}],
        "Monday (leg day)": [{"id": 2, "exercise": {"name": "B"}, "isDone": true}],
        "Caturday": [{"id": 3, "exercise": {"name": "C"}}]
    }"#;
    let schedule = Schedule::from_blob(blob)?;
    let monday = schedule.day(Weekday::Monday);
    assert_eq!(monday.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(!monday[0].is_done);
    assert!(monday[1].is_done);
    assert_eq!(monday[0].sets, None);
    assert_eq!(schedule.len(), 2);
    assert!(schedule.day(Weekday::Sunday).is_empty());

    assert!(Schedule::from_blob("[]").is_err());
    Ok(())
}

#[test]
fn test_config_nicknames() {
    let mut config = Config::default();
    assert_eq!(config.day_label(Weekday::Monday), "Monday");

    config.set_nickname(Weekday::Monday, Some(" leg day "));
    assert_eq!(config.nickname(Weekday::Monday), Some("leg day"));
    assert_eq!(config.day_label(Weekday::Monday), "Monday (leg day)");

    // Hand-written keys in any case still match
    config.day_nicknames.insert("tuesday".to_string(), "push".to_string());
    assert_eq!(config.nickname(Weekday::Tuesday), Some("push"));
    config.set_nickname(Weekday::Tuesday, Some("pull"));
    assert_eq!(config.day_nicknames.len(), 2);
    assert_eq!(config.nickname(Weekday::Tuesday), Some("pull"));

    config.set_nickname(Weekday::Monday, None);
    assert_eq!(config.nickname(Weekday::Monday), None);
}
