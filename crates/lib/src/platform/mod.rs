pub mod os;

pub use os::Os;

/// File name of a static archive for `lib` on the given OS.
///
/// Windows uses `<lib>.lib`; everything else (including an undetected OS)
/// uses `lib<lib>.a`.
pub fn static_lib_name(os: Option<Os>, lib: &str) -> String {
  match os {
    Some(Os::Windows) => format!("{}.lib", lib),
    _ => format!("lib{}.a", lib),
  }
}
