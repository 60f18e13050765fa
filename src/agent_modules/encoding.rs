use lazy_static::lazy_static;
use thiserror::Error;

#[cfg(windows)]
use windows_sys::Win32::Globalization::GetACP;

lazy_static! {
    static ref SYSTEM_ENCODING: &'static encoding_rs::Encoding = {
        #[cfg(windows)]
        {
            // Console utilities on Windows write in the active ANSI code page.
            let acp = unsafe { GetACP() };
            u16::try_from(acp)
                .ok()
                .and_then(codepage::to_encoding)
                .unwrap_or(encoding_rs::UTF_8)
        }
        #[cfg(not(windows))]
        {
            encoding_rs::UTF_8
        }
    };
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("output is not valid {encoding} text")]
pub struct DecodeError {
    pub encoding: &'static str,
}

/// Decodes captured process output. UTF-8 is tried first, then the system
/// code page. Unlike a lossy decode, invalid input is reported.
pub fn decode_output(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    if SYSTEM_ENCODING.name() != "UTF-8" {
        let (cow, _encoding_used, had_errors) = SYSTEM_ENCODING.decode(bytes);
        if !had_errors {
            return Ok(cow.into_owned());
        }
    }

    Err(DecodeError {
        encoding: SYSTEM_ENCODING.name(),
    })
}
