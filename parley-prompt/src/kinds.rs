use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use parley_core::{History, ParleyError, SamplingParams};

use crate::PromptTemplate;

const DEFAULT_SYSTEM: &str = "You are a helpful AI assistant.";

const POEM: &str = "Write a beautiful poem about {{subject}}. Make it emotional and vivid.";

const STORY: &str = "Write a short story inspired by Ruskin Bond's writing style about: {{subject}}

The story should have these characteristics:
- Simple, elegant prose
- Set in the hills or mountains of India
- Nostalgic and warm tone
- Focus on nature, childhood memories, or simple village life
- Observations about people, animals, or landscapes
- Gentle humor and wisdom
- Around 200-300 words

Write the complete story:";

const RECIPE: &str = "Write a detailed recipe for {{subject}}";

const COMPLETION_HEADER: &str = "You are an expert {{language}} programmer. Complete the following incomplete code:

```{{fence}}
{{code}}
```
";

const COMPLETION_REQUIREMENTS: &str = "
Requirements:
- Complete the missing parts of the code
- Follow {{language}} best practices and conventions
- Add appropriate comments where needed
- Ensure the code is functional and complete
- Keep the existing code structure intact

Provide ONLY the complete code, nothing else.";

/// The closed set of prompt shapes, one per kind of front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Template {
    /// Role-labelled transcript ending with the new user line.
    Plain,
    /// `Plain` followed by an `assistant:` cue.
    Chat,
    /// A system instruction followed by a `Question:` line.
    Question { system: String },
    /// Code completion; the message is the incomplete code.
    Completion(CodeCompletion),
    /// Single-shot creative writing; the message is the subject.
    Creative(CreativeKind),
}

impl Template {
    pub fn question() -> Self {
        Template::Question {
            system: DEFAULT_SYSTEM.to_string(),
        }
    }

    /// Whether prior turns are folded into the prompt.
    pub fn uses_history(&self) -> bool {
        matches!(
            self,
            Template::Plain | Template::Chat | Template::Question { .. }
        )
    }

    /// Sampling the template was tuned with; explicit caller values win.
    pub fn sampling_preset(&self) -> SamplingParams {
        match self {
            Template::Completion(_) => SamplingParams::default()
                .with_temperature(0.7)
                .with_max_output_tokens(1000),
            Template::Creative(CreativeKind::Story) => SamplingParams::default()
                .with_temperature(0.8)
                .with_top_p(0.9),
            _ => SamplingParams::default(),
        }
    }

    pub fn build(&self, history: &History, message: &str) -> String {
        build_prompt(history, message, self)
    }
}

pub fn build_prompt(history: &History, message: &str, template: &Template) -> String {
    match template {
        Template::Plain => transcript(history, message),
        Template::Chat => format!("{}\nassistant:", transcript(history, message)),
        Template::Question { system } => {
            let question = format!("Question: {message}");
            format!(
                "system: {system}\n{}\nassistant:",
                transcript(history, &question)
            )
        }
        Template::Completion(completion) => completion.render(message),
        Template::Creative(kind) => kind.template().render_one("subject", message),
    }
}

fn transcript(history: &History, message: &str) -> String {
    let mut out = String::new();
    for turn in history {
        out.push_str(turn.role().as_str());
        out.push_str(": ");
        out.push_str(turn.content());
        out.push('\n');
    }
    out.push_str("user: ");
    out.push_str(message);
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeCompletion {
    pub language: Language,
    pub instructions: Option<String>,
}

impl CodeCompletion {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    fn render(&self, code: &str) -> String {
        let language = self.language.name();
        let fence = self.language.fence_tag();
        let vars = HashMap::from([
            ("language", language),
            ("fence", fence.as_str()),
            ("code", code),
        ]);

        let mut prompt = PromptTemplate::new(COMPLETION_HEADER).render(&vars);
        if let Some(instructions) = self
            .instructions
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            prompt.push_str(&format!("\nInstructions: {instructions}\n"));
        }
        prompt.push_str(&PromptTemplate::new(COMPLETION_REQUIREMENTS).render(&vars));
        prompt
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreativeKind {
    Poem,
    Story,
    Recipe,
}

impl CreativeKind {
    fn template(&self) -> PromptTemplate {
        PromptTemplate::new(match self {
            CreativeKind::Poem => POEM,
            CreativeKind::Story => STORY,
            CreativeKind::Recipe => RECIPE,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    CSharp,
    Go,
    Rust,
    TypeScript,
    Ruby,
    Php,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::Go,
        Language::Rust,
        Language::TypeScript,
        Language::Ruby,
        Language::Php,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::TypeScript => "TypeScript",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
        }
    }

    /// Info string placed after the opening code fence.
    pub fn fence_tag(&self) -> String {
        self.name().to_lowercase()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::CSharp => "cs",
            Language::Go => "go",
            Language::Rust => "rs",
            Language::TypeScript => "ts",
            Language::Ruby => "rb",
            Language::Php => "php",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = ParleyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        let alias = match needle.as_str() {
            "py" => Some(Language::Python),
            "js" => Some(Language::JavaScript),
            "cpp" | "cxx" => Some(Language::Cpp),
            "cs" | "csharp" => Some(Language::CSharp),
            "golang" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            "ts" => Some(Language::TypeScript),
            "rb" => Some(Language::Ruby),
            _ => None,
        };
        alias
            .or_else(|| {
                Language::ALL
                    .into_iter()
                    .find(|language| language.fence_tag() == needle)
            })
            .ok_or_else(|| ParleyError::InvalidConfig(format!("unsupported language '{value}'")))
    }
}

/// Ready-made story subjects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoryTheme {
    Tree,
    Bird,
    Rain,
    Childhood,
    Village,
    Mountains,
}

impl StoryTheme {
    pub const ALL: [StoryTheme; 6] = [
        StoryTheme::Tree,
        StoryTheme::Bird,
        StoryTheme::Rain,
        StoryTheme::Childhood,
        StoryTheme::Village,
        StoryTheme::Mountains,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StoryTheme::Tree => "tree",
            StoryTheme::Bird => "bird",
            StoryTheme::Rain => "rain",
            StoryTheme::Childhood => "childhood",
            StoryTheme::Village => "village",
            StoryTheme::Mountains => "mountains",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            StoryTheme::Tree => "an old tree in the mountains",
            StoryTheme::Bird => "a bird in the garden",
            StoryTheme::Rain => "monsoon in the hills",
            StoryTheme::Childhood => "childhood memories in a hill station",
            StoryTheme::Village => "life in a small mountain village",
            StoryTheme::Mountains => "the Himalayan mountains",
        }
    }

    /// A non-blank free-text theme wins over the preset.
    pub fn resolve(custom: Option<&str>, preset: Option<StoryTheme>) -> Option<String> {
        custom
            .map(str::trim)
            .filter(|theme| !theme.is_empty())
            .map(str::to_string)
            .or_else(|| preset.map(|theme| theme.subject().to_string()))
    }
}

impl FromStr for StoryTheme {
    type Err = ParleyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        StoryTheme::ALL
            .into_iter()
            .find(|theme| theme.key() == needle)
            .ok_or_else(|| ParleyError::InvalidConfig(format!("unknown story theme '{value}'")))
    }
}
