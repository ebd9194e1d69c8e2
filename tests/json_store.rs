#![forbid(unsafe_code)]
use chrono::NaiveDate;
use garde::{
    io,
    model::{Provider, ProviderId, ShiftName, ShiftType},
    store::{EntityStore, JsonStore, StoreError},
    GenerateRequest, Scheduler,
};
use std::fs;
use std::thread;
use tempfile::tempdir;

#[test]
fn generation_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garde.json");

    {
        let mut s = Scheduler::new(JsonStore::open(&path).unwrap());
        s.register_provider(Provider::new("a", "Alice")).unwrap();
        s.register_provider(Provider::new("b", "Bob")).unwrap();
        s.register_shift_type(ShiftType::new("reg", ShiftName::Regular, "S"))
            .unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        let report = s.generate(&GenerateRequest::new(start, end)).unwrap();
        assert_eq!(report.created, 3);
    }

    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(reopened.providers().unwrap().len(), 2);
    assert_eq!(reopened.assignments().unwrap().len(), 3);
    let day = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
    let booked = reopened
        .find_assignment(&ProviderId::new("b"), day)
        .unwrap();
    assert!(booked.is_some());
}

#[test]
fn duplicate_insert_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garde.json");
    let mut store = JsonStore::open(&path).unwrap();
    store.insert_provider(Provider::new("a", "Alice")).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    assert!(store.insert_provider(Provider::new("a", "Again")).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.roster().providers.len(), 1);
}

#[test]
fn import_csv_then_export_assignments() {
    let dir = tempdir().unwrap();
    let providers_csv = dir.path().join("providers.csv");
    let shifts_csv = dir.path().join("shifts.csv");
    fs::write(
        &providers_csv,
        "id,name,fte,call_sign,acc_target,call_target,site_preferences,qualifications\n\
         a,Alice,0.8,AL,10,4,S;T,X;Y\n\
         b,Bob,1,,0,0,,\n",
    )
    .unwrap();
    fs::write(
        &shifts_csv,
        "id,name,site,weekly,requires_qualification\nreg,REG,S,no,X\ncall,CALL,S,yes,\n",
    )
    .unwrap();

    let providers = io::import_providers_csv(&providers_csv).unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].site_preferences, ["S", "T"]);
    assert!(providers[0].is_qualified("Y"));
    assert_eq!(providers[0].call_sign.as_deref(), Some("AL"));
    assert!(providers[1].qualifications.is_empty());

    let shifts = io::import_shift_types_csv(&shifts_csv).unwrap();
    assert_eq!(shifts[0].requires_qualification.as_deref(), Some("X"));
    assert!(shifts[1].weekly);
    assert_eq!(shifts[1].name, ShiftName::OnCall);

    let path = dir.path().join("garde.json");
    let mut s = Scheduler::new(JsonStore::open(&path).unwrap());
    for p in providers {
        s.register_provider(p).unwrap();
    }
    for sh in shifts {
        s.register_shift_type(sh).unwrap();
    }
    let d = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
    s.generate(&GenerateRequest::new(d, d.succ_opt().unwrap()))
        .unwrap();

    let out = dir.path().join("assignments.csv");
    io::export_assignments_csv(&out, &s.assignments().unwrap()).unwrap();
    let csv = fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,provider_id,date,shift_type,site,generated_by,audited_by")
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.contains(",a,") && r.ends_with(",REG,S,AI,")));
}

#[test]
fn bad_shift_name_in_csv_is_an_error() {
    let dir = tempdir().unwrap();
    let shifts_csv = dir.path().join("shifts.csv");
    fs::write(&shifts_csv, "id,name,site\nx,NIGHT,S\n").unwrap();
    assert!(io::import_shift_types_csv(&shifts_csv).is_err());
}

#[test]
fn second_handle_waits_for_the_first_and_sees_its_bookings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garde.json");
    let day = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

    let mut first = Scheduler::new(JsonStore::open(&path).unwrap());
    first
        .register_providers(vec![Provider::new("a", "Alice"), Provider::new("b", "Bob")])
        .unwrap();
    first
        .register_shift_type(ShiftType::new("reg", ShiftName::Regular, "S"))
        .unwrap();

    assert!(JsonStore::try_open(&path).is_err());

    let other = path.clone();
    let waiter = thread::spawn(move || {
        let mut second = Scheduler::new(JsonStore::open(&other).unwrap());
        second.generate(&GenerateRequest::day(day)).unwrap()
    });

    let report = first.generate(&GenerateRequest::day(day)).unwrap();
    assert_eq!(report.created, 1);
    drop(first);

    let report = waiter.join().unwrap();
    assert_eq!(report.created, 1);

    let reopened = JsonStore::try_open(&path).unwrap();
    let mut booked: Vec<&str> = reopened
        .roster()
        .assignments
        .iter()
        .filter(|a| a.date == day)
        .map(|a| a.provider_id.as_str())
        .collect();
    booked.sort_unstable();
    assert_eq!(booked, ["a", "b"]);
}

#[test]
fn failed_save_rolls_back_the_insert() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("data");
    fs::create_dir(&sub).unwrap();
    let mut store = JsonStore::open(sub.join("garde.json")).unwrap();
    store.insert_provider(Provider::new("a", "Alice")).unwrap();

    fs::remove_dir_all(&sub).unwrap();
    let err = store
        .insert_provider(Provider::new("b", "Bob"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    assert_eq!(store.roster().providers.len(), 1);
    assert!(store
        .find_provider(&ProviderId::new("b"))
        .unwrap()
        .is_none());
}
