//! FFI bindings for MindMate
//!
//! This module provides C-compatible functions for calling the analytics engine
//! from the mobile host. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `mindmate_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::encoder::SnapshotEncoder;
use crate::engine::{entries_to_report, entries_to_snapshot, parse_now, WellnessEngine};
use crate::error::AnalyticsError;
use crate::heuristics;
use crate::prompts;
use crate::sentiment::LexiconScorer;
use chrono::Utc;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(e) => {
            set_last_error(&AnalyticsError::EncodingError(e.to_string()).to_string());
            ptr::null_mut()
        }
    }
}

/// Hand a result across the boundary, recording the error on failure
fn result_to_cstr(result: Result<String, AnalyticsError>) -> *mut c_char {
    match result {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Derive analytics from a stored entry list and return snapshot JSON.
///
/// # Safety
/// - `entries_json` must be a valid null-terminated C string.
/// - `now_rfc3339` must be a valid null-terminated C string, or NULL for the current time.
/// - Returns a newly allocated string that must be freed with `mindmate_free_string`.
/// - Returns NULL on error; call `mindmate_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindmate_analyze(
    entries_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries string pointer");
            return ptr::null_mut();
        }
    };
    let now_str = cstr_to_string(now_rfc3339);

    result_to_cstr(entries_to_snapshot(&json_str, now_str.as_deref()))
}

/// Derive analytics from a stored entry list and return the weekly report text.
///
/// # Safety
/// - `entries_json` must be a valid null-terminated C string.
/// - `now_rfc3339` must be a valid null-terminated C string, or NULL for the current time.
/// - Returns a newly allocated string that must be freed with `mindmate_free_string`.
/// - Returns NULL on error; call `mindmate_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindmate_report(
    entries_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries string pointer");
            return ptr::null_mut();
        }
    };
    let now_str = cstr_to_string(now_rfc3339);

    result_to_cstr(entries_to_report(&json_str, now_str.as_deref()))
}

/// Level for a total entry count.
#[no_mangle]
pub extern "C" fn mindmate_level(total_entries: u64) -> u32 {
    heuristics::level(usize::try_from(total_entries).unwrap_or(usize::MAX))
}

/// Pick a random motivational prompt.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `mindmate_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mindmate_motivational_prompt() -> *mut c_char {
    clear_last_error();
    string_to_cstr(prompts::motivational_prompt(&mut rand::thread_rng()))
}

// ============================================================================
// Configured Engine API
// ============================================================================

/// Opaque handle to a configured WellnessEngine
pub struct MindmateEngineHandle {
    engine: WellnessEngine,
    encoder: SnapshotEncoder,
}

/// Create an engine from a JSON configuration.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string, or NULL for defaults.
/// - Returns a pointer to a newly allocated engine; free it with `mindmate_engine_free`.
/// - Returns NULL on error; call `mindmate_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindmate_engine_new(config_json: *const c_char) -> *mut MindmateEngineHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        None => EngineConfig::default(),
        Some(json) => match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&AnalyticsError::from(e).to_string());
                return ptr::null_mut();
            }
        },
    };

    let handle = Box::new(MindmateEngineHandle {
        engine: WellnessEngine::new(config),
        encoder: SnapshotEncoder::new(),
    });
    Box::into_raw(handle)
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindmate_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindmate_engine_free(engine: *mut MindmateEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Derive analytics with a configured engine and return snapshot JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindmate_engine_new`.
/// - `entries_json` must be a valid null-terminated C string.
/// - `now_rfc3339` must be a valid null-terminated C string, or NULL for the current time.
/// - Returns a newly allocated string that must be freed with `mindmate_free_string`.
/// - Returns NULL on error; call `mindmate_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindmate_engine_analyze(
    engine: *const MindmateEngineHandle,
    entries_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let json_str = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries string pointer");
            return ptr::null_mut();
        }
    };
    let now = match cstr_to_string(now_rfc3339) {
        Some(s) => match parse_now(&s) {
            Ok(now) => now,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => Utc::now(),
    };

    let derived = handle
        .engine
        .derive_payload(&json_str, now, Some(&LexiconScorer::new()));

    result_to_cstr(handle.encoder.encode_to_json(&derived))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by MindMate functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a MindMate function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindmate_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next MindMate function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mindmate_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the MindMate library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mindmate_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
