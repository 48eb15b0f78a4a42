//! Typed prompt templates
//!
//! A template is a (system, user) instruction pair with named slots such as
//! `{profile}`. Rendering is a single literal pass: substituted values are
//! never scanned again, so braces inside a profile or a previous analysis
//! cannot be mistaken for template syntax. `{{` and `}}` produce literal
//! braces.

use std::borrow::Cow;
use std::fmt;

use llm_core::Message;

use crate::error::ValidationError;

/// Named slot a template can reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Canonical profile text
    Profile,
    /// Text of the preceding profiling analysis
    Analysis,
}

impl Placeholder {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Analysis => "analysis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "profile" => Some(Self::Profile),
            "analysis" => Some(Self::Analysis),
            _ => None,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values supplied to a render
#[derive(Clone, Copy, Debug, Default)]
pub struct PromptVars<'a> {
    profile: Option<&'a str>,
    analysis: Option<&'a str>,
}

impl<'a> PromptVars<'a> {
    pub const fn new() -> Self {
        Self {
            profile: None,
            analysis: None,
        }
    }

    #[must_use]
    pub const fn profile(mut self, text: &'a str) -> Self {
        self.profile = Some(text);
        self
    }

    #[must_use]
    pub const fn analysis(mut self, text: &'a str) -> Self {
        self.analysis = Some(text);
        self
    }

    pub const fn get(&self, placeholder: Placeholder) -> Option<&'a str> {
        match placeholder {
            Placeholder::Profile => self.profile,
            Placeholder::Analysis => self.analysis,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'t> {
    Literal(&'t str),
    Slot(Placeholder),
}

/// Split template text into literal runs and slots
fn parse(text: &str) -> Result<Vec<Segment<'_>>, ValidationError> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            segments.push(Segment::Literal(&rest[..pos]));
        }
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            segments.push(Segment::Literal("{"));
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            segments.push(Segment::Literal("}"));
            rest = after;
        } else if tail.starts_with('}') {
            let offset = text.len() - tail.len();
            return Err(ValidationError::MalformedTemplate(format!(
                "unmatched '}}' at byte {offset}"
            )));
        } else {
            let end = tail.find('}').ok_or_else(|| {
                ValidationError::MalformedTemplate("unterminated placeholder".into())
            })?;
            let name = &tail[1..end];
            let slot = Placeholder::from_name(name)
                .ok_or_else(|| ValidationError::UnknownPlaceholder(name.to_string()))?;
            segments.push(Segment::Slot(slot));
            rest = &tail[end + 1..];
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

fn substitute(text: &str, vars: &PromptVars<'_>) -> Result<String, ValidationError> {
    let mut out = String::with_capacity(text.len());
    for segment in parse(text)? {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Slot(slot) => {
                out.push_str(vars.get(slot).ok_or(ValidationError::MissingPlaceholder(slot))?);
            }
        }
    }
    Ok(out)
}

/// A (system, user) instruction pair with declared slots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    system: Cow<'static, str>,
    user: Cow<'static, str>,
    required: &'static [Placeholder],
}

impl PromptTemplate {
    pub const fn new(
        system: &'static str,
        user: &'static str,
        required: &'static [Placeholder],
    ) -> Self {
        Self {
            system: Cow::Borrowed(system),
            user: Cow::Borrowed(user),
            required,
        }
    }

    /// Build a template from runtime text, checking it is well formed
    pub fn custom(
        system: impl Into<String>,
        user: impl Into<String>,
        required: &'static [Placeholder],
    ) -> Result<Self, ValidationError> {
        let template = Self {
            system: Cow::Owned(system.into()),
            user: Cow::Owned(user.into()),
            required,
        };
        template.check()?;
        Ok(template)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub const fn required(&self) -> &'static [Placeholder] {
        self.required
    }

    /// Every slot referenced must be declared, and every declared slot used
    pub fn check(&self) -> Result<(), ValidationError> {
        let mut used = Vec::new();
        for text in [self.system(), self.user()] {
            for segment in parse(text)? {
                if let Segment::Slot(slot) = segment {
                    if !self.required.contains(&slot) {
                        return Err(ValidationError::UnknownPlaceholder(slot.name().into()));
                    }
                    used.push(slot);
                }
            }
        }

        if let Some(unused) = self.required.iter().find(|p| !used.contains(*p)) {
            return Err(ValidationError::MalformedTemplate(format!(
                "declared placeholder {{{unused}}} is never used"
            )));
        }
        Ok(())
    }

    /// Render both instructions; fails if any declared slot has no value
    pub fn render(&self, vars: &PromptVars<'_>) -> Result<RenderedPrompt, ValidationError> {
        if let Some(missing) = self.required.iter().find(|p| vars.get(**p).is_none()) {
            return Err(ValidationError::MissingPlaceholder(*missing));
        }

        Ok(RenderedPrompt {
            system: substitute(&self.system, vars)?,
            user: substitute(&self.user, vars)?,
        })
    }
}

/// Fully substituted instructions, ready for the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl RenderedPrompt {
    pub fn messages(&self) -> Vec<Message> {
        Message::instruction_pair(self.system.clone(), self.user.clone())
    }

    /// Combined size in bytes, for logging
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}
