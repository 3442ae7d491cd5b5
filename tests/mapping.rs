//! Mapping lifecycle tests
//!
//! A one-page temp file stands in for `/dev/gpiomem`. The mapping slot is
//! process-wide, so every test holds `SERIAL`.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bcm2835_gpio::bank::mapped;
use bcm2835_gpio::{Access, Config, Direction, Error, Level, Manager};
use tempfile::NamedTempFile;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

fn window_file() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(4096).unwrap();
    file
}

fn config(path: &Path) -> Config {
    Config::default()
        .with_access(Access::Gpiomem)
        .with_device(path)
}

fn cell(bytes: &[u8], index: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[index * 4..index * 4 + 4]);
    u32::from_ne_bytes(word)
}

#[test]
fn test_second_open_fails_until_close() {
    let _serial = serial();
    let file = window_file();
    let config = config(file.path());

    let gpio = Manager::open_with(&config).unwrap();
    assert!(mapped::is_open());
    assert!(matches!(Manager::open_with(&config), Err(Error::AlreadyOpen)));

    gpio.close().unwrap();
    assert!(!mapped::is_open());

    let gpio = Manager::open_with(&config).unwrap();
    gpio.close().unwrap();
}

#[test]
fn test_missing_device_releases_slot() {
    let _serial = serial();
    let config = config(Path::new("/nonexistent/gpiomem"));

    match Manager::open_with(&config) {
        Err(Error::DeviceOpen { path, source }) => {
            assert_eq!(path, Path::new("/nonexistent/gpiomem"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(!mapped::is_open());
}

#[test]
fn test_unmappable_device_releases_slot() {
    let _serial = serial();
    let config = config(Path::new("/dev/null"));

    assert!(matches!(Manager::open_with(&config), Err(Error::Map { .. })));
    assert!(!mapped::is_open());
}

#[test]
fn test_drop_releases_slot() {
    let _serial = serial();
    let file = window_file();

    drop(Manager::open_with(&config(file.path())).unwrap());
    assert!(!mapped::is_open());
}

#[test]
fn test_register_writes_reach_device() {
    let _serial = serial();
    let file = window_file();

    let gpio = Manager::open_with(&config(file.path())).unwrap();
    let pin = gpio.pin(17).unwrap();
    pin.set_direction(Direction::Out);
    pin.set_value(Level::High);
    pin.pull_down();
    gpio.close().unwrap();

    let bytes = fs::read(file.path()).unwrap();
    assert_eq!(bytes.len(), 4096);
    assert_eq!(cell(&bytes, 1), 0b001 << 21);
    assert_eq!(cell(&bytes, 7), 1 << 17);
    assert_eq!(cell(&bytes, 37), 0);
    assert_eq!(cell(&bytes, 38), 0);
}

#[test]
fn test_reads_see_device_contents() {
    let _serial = serial();
    let file = window_file();

    let mut bytes = vec![0u8; 4096];
    bytes[13 * 4..13 * 4 + 4].copy_from_slice(&(1u32 << 4).to_ne_bytes());
    fs::write(file.path(), &bytes).unwrap();

    let gpio = Manager::open_with(&config(file.path())).unwrap();
    assert_eq!(gpio.pin(4).unwrap().value(), Level::High);
    assert_eq!(gpio.pin(5).unwrap().value(), Level::Low);
    gpio.close().unwrap();
}
