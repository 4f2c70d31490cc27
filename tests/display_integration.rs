/*
 *  tests/display_integration.rs
 *
 *  Integration tests for display system
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 */

use lcd5110::commands::{demo_requests, parse_script};
use lcd5110::display::dispatch::{code, DrawShape, DrawString};
use lcd5110::display::drivers::{DisplayMode, MockTransport, WireEvent};
use lcd5110::display::{
    Area, Cursor, DisplayError, FontSize, Level, Pcd8544Driver, Pixel, Request, SharedDisplay,
    BUFFER_SIZE, HEIGHT, WIDTH,
};
use std::path::Path;

fn attached() -> (Pcd8544Driver<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    let mut driver = Pcd8544Driver::new(mock.clone());
    driver.init(40).unwrap();
    mock.clear_events();
    (driver, mock)
}

#[test]
fn test_init_brings_panel_up() {
    let mock = MockTransport::new();
    let mut driver = Pcd8544Driver::new(mock.clone());
    driver.init(40).unwrap();

    let panel = mock.panel();
    assert!(!panel.is_powered_down());
    assert!(!panel.is_extended());
    assert_eq!(panel.vop(), 40);
    assert_eq!(panel.bias(), 3);
    assert_eq!(panel.temperature_coefficient(), 2);
    assert_eq!(panel.mode(), DisplayMode::Normal);
    assert!(panel.ram().iter().all(|&b| b == 0));
}

#[test]
fn test_init_twice_is_identical() {
    let mock = MockTransport::new();
    let mut driver = Pcd8544Driver::new(mock.clone());

    driver.init(40).unwrap();
    let first = (mock.events(), driver.config());
    mock.clear_events();

    driver.init(40).unwrap();
    assert_eq!((mock.events(), driver.config()), first);
    assert_eq!(first.0.iter().filter(|e| matches!(e, WireEvent::Reset(Level::Low))).count(), 1);
}

#[test]
fn test_flush_sends_intersecting_banks_only() {
    let (mut driver, mock) = attached();
    driver.draw_filled_rectangle(30, 17, 40, 30, Pixel::Set);
    assert_eq!(driver.dirty_region().area(), Some(Area { x_min: 30, y_min: 17, x_max: 40, y_max: 30 }));

    assert_eq!(driver.flush().unwrap(), 2 * 11);
    // banks 2 and 3 cover rows 16..=31
    assert_eq!(mock.commands(), vec![0x42, 0x80 | 30, 0x43, 0x80 | 30]);
    assert_eq!(mock.data().len(), 22);

    mock.clear_events();
    assert_eq!(driver.flush().unwrap(), 0);
    assert!(mock.events().is_empty());
}

#[test]
fn test_panel_matches_framebuffer_after_flush() {
    let (mut driver, mock) = attached();

    driver.draw_circle(20, 20, 15, Pixel::Set);
    driver.draw_line(0, 47, 83, 0, Pixel::Set);
    driver.flush().unwrap();
    assert_eq!(mock.panel().ram(), driver.framebuffer().as_bytes());

    driver.draw_filled_circle(60, 30, 10, Pixel::Set);
    driver.goto_xy(2, 40).unwrap();
    driver.put_string("done", Pixel::Clear, FontSize::Font3x5);
    driver.flush().unwrap();
    assert_eq!(mock.panel().ram(), driver.framebuffer().as_bytes());

    driver.clear();
    driver.flush().unwrap();
    assert!(mock.panel().ram().iter().all(|&b| b == 0));
}

#[test]
fn test_transport_failure_midway_keeps_dirty_region() {
    let (mut driver, mock) = attached();
    driver.draw_line(0, 0, 83, 47, Pixel::Set);
    let dirty = driver.dirty_region();

    // dies part way through the second bank's data
    mock.fail_after(2 + WIDTH + 2 + 10);
    let err = driver.flush().unwrap_err();
    assert!(matches!(err, DisplayError::Transport(_)));
    assert_eq!(driver.dirty_region(), dirty);

    mock.reset_state();
    driver.flush().unwrap();
    assert!(driver.dirty_region().is_empty());
    // fresh mock state only saw the retry, which still covers every bank
    assert_eq!(mock.data().len(), BUFFER_SIZE);
}

#[test]
fn test_write_string_advances_cursor() {
    let (mut driver, _mock) = attached();
    let display = {
        driver.home().unwrap();
        SharedDisplay::new(driver)
    };
    display
        .dispatch(&Request::WriteString(DrawString::new("AB", Pixel::Set, FontSize::Font5x7)))
        .unwrap();
    assert_eq!(display.with(|d| d.cursor()).unwrap(), Cursor { x: 12, y: 0 });
}

#[test]
fn test_line_is_direction_independent_through_requests() {
    let (a, _) = attached();
    let (b, _) = attached();
    let (a, b) = (SharedDisplay::new(a), SharedDisplay::new(b));

    a.dispatch(&Request::DrawLine(DrawShape { x0: 0, y0: 0, x1: 83, y1: 47, pixel: Pixel::Set })).unwrap();
    b.dispatch(&Request::DrawLine(DrawShape { x0: 83, y0: 47, x1: 0, y1: 0, pixel: Pixel::Set })).unwrap();

    let fa = a.with(|d| *d.framebuffer().as_bytes()).unwrap();
    let fb = b.with(|d| *d.framebuffer().as_bytes()).unwrap();
    assert_eq!(fa, fb);
}

#[test]
fn test_raw_dispatch_errors() {
    let (driver, mock) = attached();
    let display = SharedDisplay::new(driver);

    assert!(matches!(
        display.dispatch_raw(code::DRAW_CIRCLE, &[10, 10]),
        Err(DisplayError::PayloadCopyFailure(_))
    ));
    assert!(matches!(display.dispatch_raw(42, &[]), Err(DisplayError::UnsupportedOperation(42))));
    assert!(display.with(|d| d.dirty_region().is_empty()).unwrap());
    assert!(mock.events().is_empty());
}

#[test]
fn test_invert_request_reaches_panel() {
    let (driver, mock) = attached();
    let display = SharedDisplay::new(driver);
    display.dispatch_raw(code::INVERT, &[1]).unwrap();
    assert_eq!(mock.panel().mode(), DisplayMode::Inverted);
    display.dispatch(&Request::Invert(false)).unwrap();
    assert_eq!(mock.panel().mode(), DisplayMode::Normal);
}

#[test]
fn test_demo_screen_renders() {
    let (driver, mock) = attached();
    let display = SharedDisplay::new(driver);
    for request in demo_requests() {
        display.dispatch(&request).unwrap();
    }

    let panel = mock.panel();
    let fb = display.with(|d| *d.framebuffer().as_bytes()).unwrap();
    assert_eq!(panel.ram(), &fb);
    // border corners
    for (x, y) in [(0, 0), (WIDTH as i32 - 1, 0), (0, HEIGHT as i32 - 1), (WIDTH as i32 - 1, HEIGHT as i32 - 1)] {
        assert_eq!(panel.get_pixel(x, y), Pixel::Set);
    }
    let preview = panel.to_ascii();
    assert_eq!(preview.lines().count(), HEIGHT);
}

#[test]
fn test_script_drives_display() {
    let script = "\
# draw a framed dot
clear
rect 10 10 20 20
pixel 15 15
goto 0 30
text --font 3x5 hi
";
    let requests = parse_script(Path::new("frame.lcd"), script).unwrap();
    let (driver, mock) = attached();
    let display = SharedDisplay::new(driver);
    for request in &requests {
        display.dispatch(request).unwrap();
    }
    display.dispatch(&Request::Flush).unwrap();

    let panel = mock.panel();
    assert_eq!(panel.get_pixel(15, 15), Pixel::Set);
    assert_eq!(panel.get_pixel(10, 20), Pixel::Set);
    assert_eq!(panel.get_pixel(14, 14), Pixel::Clear);
    assert_eq!(display.with(|d| d.cursor()).unwrap(), Cursor { x: 8, y: 30 });
}
