use std::{thread, time::Duration};
mod common;

#[test]
fn relative_expiration() {
    let server = common::spawn_server(common::MemtxtdServerParamsBuilder::new());
    let mut client = server.connect();

    assert_eq!(client.store("set", "short", b"value", 0, 1), "STORED");
    assert_eq!(client.store("set", "long", b"value", 0, 3600), "STORED");
    assert_eq!(client.store("set", "never", b"value", 0, -1), "STORED");
    thread::sleep(Duration::from_millis(2500));
    assert_eq!(client.get("short"), None);
    assert_eq!(client.get("long"), Some(String::from("value")));
    assert_eq!(client.get("never"), Some(String::from("value")));
}

#[test]
fn past_absolute_expiration_is_absent() {
    let server = common::spawn_server(common::MemtxtdServerParamsBuilder::new());
    let mut client = server.connect();

    assert_eq!(client.store("set", "foo", b"value", 0, 2_592_001), "STORED");
    assert_eq!(client.get("foo"), None);
}

#[test]
fn touch_updates_expiration() {
    let server = common::spawn_server(common::MemtxtdServerParamsBuilder::new());
    let mut client = server.connect();

    assert_eq!(client.store("set", "foo", b"value", 0, 1), "STORED");
    client.send(b"touch foo 3600\r\n");
    thread::sleep(Duration::from_millis(2500));
    assert_eq!(client.get("foo"), Some(String::from("value")));
    assert_eq!(client.request("touch missing 10"), "NOT_FOUND");
}
