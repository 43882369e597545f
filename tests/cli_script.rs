use std::fs;
use std::io::Cursor;

use assert_cmd::Command;
use predicates::str::contains;
use ride_wizard::cli::{run_with_prompter, CliArgs, ScriptPrompter, SCRIPT_MODE_ENV};
use ride_wizard::storage::{JsonRideStore, RIDE_SOURCE_RECEIPT_IMPORT};
use ride_wizard::{PaymentMethod, TimeOfDay};
use tempfile::TempDir;

const RECEIPT: &str = "\
Cl. 19 #12-50, Pereira
mar, 2 dic 2025   07:52 p.m.
Duración 20 min.
Distancia 6,4 km
Pago en efectivo
Mis ingresos
15.965,10 COP
Tarifa 18.000,00 COP
Total recibido 18.000,00 COP
Pagos por el servicio (9,5 %) 1.710,00 COP
IVA del pago por el servicio 324,90 COP
Total pagado 2.034,90 COP
";

#[test]
fn version_flag_prints_build_summary() {
    let mut cmd = Command::cargo_bin("ride_wizard_cli").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(contains(format!("ride_wizard {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn script_mode_registers_a_ride() {
    let temp = TempDir::new().unwrap();
    let input = [
        "2024-06-01 14:30",
        "Cable Plaza",
        "Aeropuerto La Nubia",
        "quince mil",
        "15.000",
        "whatsapp",
        "personal",
        "tarde",
        "no",
        "efectivo",
        "no",
        "",
        "enviar",
        "no",
    ]
    .join("\n");

    let mut cmd = Command::cargo_bin("ride_wizard_cli").unwrap();
    cmd.env(SCRIPT_MODE_ENV, "1")
        .arg("--driver")
        .arg("driver-1")
        .arg("--data-dir")
        .arg(temp.path())
        .write_stdin(format!("{input}\n"))
        .assert()
        .success()
        .stdout(contains("Escribe un valor numérico"))
        .stdout(contains("¡Carrera registrada!"));

    let rides = fs::read_to_string(temp.path().join("rides").join("driver-1.json")).unwrap();
    assert!(rides.contains("Aeropuerto La Nubia"));
    let config = fs::read_to_string(temp.path().join("config.json")).unwrap();
    assert!(config.contains("\"last_driver_id\": \"driver-1\""));
}

#[test]
fn script_mode_without_driver_fails() {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("ride_wizard_cli").unwrap();
    cmd.env(SCRIPT_MODE_ENV, "1")
        .arg("--data-dir")
        .arg(temp.path())
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("no driver given"));
}

#[test]
fn prefilled_receipt_only_needs_the_missing_answers() {
    let temp = TempDir::new().unwrap();
    let receipt = temp.path().join("receipt.txt");
    fs::write(&receipt, RECEIPT).unwrap();

    let answers = [
        "",            // date and time from the receipt
        "Cable Plaza", // origin
        "",            // destination from the receipt
        "",            // fare from the receipt
        "2",           // request source: phone
        "1",           // trip reason: personal
        "",            // time of day derived from the receipt time
        "si",          // recurring
        "",            // payment method from the receipt
        "si 2.000",    // tip
        "Buen viaje",  // comments
        "",            // send
        "",            // register another? default no
    ]
    .join("\n");
    let args = CliArgs {
        driver: Some("driver-7".into()),
        vehicle: Some("veh-3".into()),
        prefill: Some(receipt),
        data_dir: Some(temp.path().to_path_buf()),
        ..CliArgs::default()
    };

    let registered =
        run_with_prompter(args, Box::new(ScriptPrompter::new(Cursor::new(answers)))).unwrap();
    assert_eq!(registered, 1);

    let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
    let rides = store.list("driver-7").unwrap();
    assert_eq!(rides.len(), 1);
    let ride = &rides[0].ride;
    assert_eq!(ride.date, "2025-12-02");
    assert_eq!(ride.time, "19:52");
    assert_eq!(ride.destination_address, "Cl. 19 #12-50, Pereira");
    assert_eq!(ride.total_received, 18_000.0);
    assert_eq!(ride.time_of_day, TimeOfDay::Evening);
    assert_eq!(ride.payment_method, PaymentMethod::Cash);
    assert!(ride.is_recurring);
    assert_eq!(ride.tip_amount, Some(2_000.0));
    assert_eq!(ride.comments.as_deref(), Some("Buen viaje"));
    assert_eq!(rides[0].vehicle_id.as_deref(), Some("veh-3"));
}

const CANCELLED_RECEIPT: &str = "\
El pasajero canceló el viaje
mar, 2 dic 2025   08:10 p.m.
";

#[test]
fn import_registers_completed_receipts_and_skips_cancelled_ones() {
    let temp = TempDir::new().unwrap();
    let completed = temp.path().join("completed.txt");
    fs::write(&completed, RECEIPT).unwrap();
    let cancelled = temp.path().join("cancelled.txt");
    fs::write(&cancelled, CANCELLED_RECEIPT).unwrap();
    let unreadable = temp.path().join("missing.txt");

    let answers = [
        "Parque Olaya", // origin for every ride
        "whatsapp",     // request source
        "trabajo",      // trip reason
        "no",           // recurring
        "",             // payment method from each receipt
        "no",           // tip
    ]
    .join("\n");
    let args = CliArgs {
        driver: Some("driver-4".into()),
        import: vec![completed, cancelled, unreadable],
        data_dir: Some(temp.path().to_path_buf()),
        ..CliArgs::default()
    };

    let imported =
        run_with_prompter(args, Box::new(ScriptPrompter::new(Cursor::new(answers)))).unwrap();
    assert_eq!(imported, 1);

    let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
    let rides = store.list("driver-4").unwrap();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].source, RIDE_SOURCE_RECEIPT_IMPORT);
    assert_eq!(rides[0].ride.origin_address, "Parque Olaya");
    assert_eq!(rides[0].ride.destination_address, "Cl. 19 #12-50, Pereira");
    assert_eq!(rides[0].ride.payment_method, PaymentMethod::Cash);
    let config = fs::read_to_string(temp.path().join("config.json")).unwrap();
    assert!(config.contains("\"last_driver_id\": \"driver-4\""));
}

#[test]
fn import_reports_skipped_receipts_on_stdout() {
    let temp = TempDir::new().unwrap();
    let cancelled = temp.path().join("cancelled.txt");
    fs::write(&cancelled, CANCELLED_RECEIPT).unwrap();

    let mut cmd = Command::cargo_bin("ride_wizard_cli").unwrap();
    cmd.env(SCRIPT_MODE_ENV, "1")
        .arg("--driver")
        .arg("driver-4")
        .arg("--data-dir")
        .arg(temp.path())
        .arg("--import")
        .arg(&cancelled)
        .write_stdin("Parque Olaya\n1\n1\nno\n\nno\n")
        .assert()
        .success()
        .stdout(contains("1 de 1 comprobantes"))
        .stdout(contains("omitido: Carrera cancelada"));
    assert!(!temp.path().join("config.json").exists());
}

#[test]
fn a_typed_comment_can_be_cleared_before_sending() {
    let temp = TempDir::new().unwrap();
    let answers = [
        "2024-06-01 14:30",
        "Cable Plaza",
        "Aeropuerto La Nubia",
        "15.000",
        "whatsapp",
        "personal",
        "tarde",
        "no",
        "efectivo",
        "no",
        "Llamar al llegar", // comment
        "<",                // back from confirmation
        "-",                // clear the comment
        "",                 // continue without one
        "enviar",
        "no",
    ]
    .join("\n");
    let args = CliArgs {
        driver: Some("driver-5".into()),
        data_dir: Some(temp.path().to_path_buf()),
        ..CliArgs::default()
    };

    let registered =
        run_with_prompter(args, Box::new(ScriptPrompter::new(Cursor::new(answers)))).unwrap();
    assert_eq!(registered, 1);
    let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
    assert_eq!(store.list("driver-5").unwrap()[0].ride.comments, None);
}
