//! Order dispatch through a chat deep link.
//!
//! The link is `<prefix>/<digits>?text=<body>` and is handed to the host
//! environment to open. Nothing confirms delivery; an error here only means
//! the link could not be opened.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::value_objects::PhoneNumber;

pub const DEFAULT_LINK_PREFIX: &str = "https://wa.me";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-').remove(b'_').remove(b'.').remove(b'!').remove(b'~')
    .remove(b'*').remove(b'\'').remove(b'(').remove(b')');

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to launch {program}: {source}")]
    Launch { program: String, #[source] source: std::io::Error },

    #[error("{program} exited with {status}")]
    OpenerFailed { program: String, status: std::process::ExitStatus },

    #[error("Dispatch unavailable: {0}")]
    Unavailable(String),
}

pub fn deep_link(prefix: &str, destination: &PhoneNumber, body: &str) -> String {
    format!("{}/{}?text={}", prefix.trim_end_matches('/'), destination, utf8_percent_encode(body, COMPONENT))
}

/// Hands a message to the outside world.
#[allow(async_fn_in_trait)]
pub trait Dispatcher {
    async fn dispatch(&self, destination: &PhoneNumber, body: &str) -> Result<(), DispatchError>;
}

/// Opens a URL in the host environment.
#[allow(async_fn_in_trait)]
pub trait LinkOpener {
    async fn open(&self, url: &str) -> Result<(), DispatchError>;
}

/// Writes the link to stdout for the user to follow.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl LinkOpener for PrintOpener {
    async fn open(&self, url: &str) -> Result<(), DispatchError> {
        println!("{url}");
        Ok(())
    }
}

/// Runs an external program (`xdg-open`, `open`, a browser) with the link as its last argument.
#[derive(Debug, Clone)]
pub struct CommandOpener { program: String, args: Vec<String> }

impl CommandOpener {
    /// Splits `command` on whitespace: the first word is the program.
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self { program, args: words.collect() })
    }
}

impl LinkOpener for CommandOpener {
    async fn open(&self, url: &str) -> Result<(), DispatchError> {
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .status()
            .await
            .map_err(|source| DispatchError::Launch { program: self.program.clone(), source })?;
        if !status.success() {
            return Err(DispatchError::OpenerFailed { program: self.program.clone(), status });
        }
        Ok(())
    }
}

/// Either opener, chosen from configuration at startup.
#[derive(Debug, Clone)]
pub enum HostOpener { Print(PrintOpener), Command(CommandOpener) }

impl LinkOpener for HostOpener {
    async fn open(&self, url: &str) -> Result<(), DispatchError> {
        match self {
            Self::Print(o) => o.open(url).await,
            Self::Command(o) => o.open(url).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeepLinkDispatcher<O> { prefix: String, opener: O }

impl<O: LinkOpener> DeepLinkDispatcher<O> {
    pub fn new(prefix: impl Into<String>, opener: O) -> Self { Self { prefix: prefix.into(), opener } }
}

impl<O: LinkOpener> Dispatcher for DeepLinkDispatcher<O> {
    async fn dispatch(&self, destination: &PhoneNumber, body: &str) -> Result<(), DispatchError> {
        let url = deep_link(&self.prefix, destination, body);
        debug!(%destination, len = url.len(), "opening chat link");
        self.opener.open(&url).await?;
        info!(%destination, "chat link opened");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder { urls: Mutex<Vec<String>> }

    impl LinkOpener for &Recorder {
        async fn open(&self, url: &str) -> Result<(), DispatchError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_deep_link_encoding() {
        let to = PhoneNumber::parse("+20 155 760 9572").unwrap();
        let url = deep_link("https://wa.me/", &to, "Hi! (2 × pipes)\n& more @ 50%");
        assert_eq!(url, "https://wa.me/201557609572?text=Hi!%20(2%20%C3%97%20pipes)%0A%26%20more%20%40%2050%25");
    }

    #[tokio::test]
    async fn test_dispatcher_opens_link() {
        let recorder = Recorder::default();
        let dispatcher = DeepLinkDispatcher::new(DEFAULT_LINK_PREFIX, &recorder);
        let to = PhoneNumber::parse("201557609572").unwrap();
        dispatcher.dispatch(&to, "a b").await.unwrap();
        assert_eq!(*recorder.urls.lock().unwrap(), vec!["https://wa.me/201557609572?text=a%20b".to_string()]);
    }

    #[tokio::test]
    async fn test_command_opener_failure_surfaces() {
        let opener = CommandOpener::parse("definitely-not-a-real-opener-binary --flag").unwrap();
        assert!(matches!(opener.open("https://wa.me/1").await, Err(DispatchError::Launch { .. })));
        assert!(CommandOpener::parse("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_opener_nonzero_exit() {
        let opener = CommandOpener::parse("false").unwrap();
        let err = opener.open("https://wa.me/1").await.unwrap_err();
        assert!(matches!(err, DispatchError::OpenerFailed { ref program, .. } if program == "false"), "got: {err:?}");
        let dispatcher = DeepLinkDispatcher::new(DEFAULT_LINK_PREFIX, HostOpener::Command(opener));
        let to = PhoneNumber::parse("201557609572").unwrap();
        assert!(dispatcher.dispatch(&to, "hi").await.is_err());
    }
}
