//! Chat reply generation. The shipped implementation is a canned responder
//! with a keyword safety check; a model-backed implementation can be dropped
//! in behind the same trait.

use std::sync::LazyLock;

use rand::seq::IndexedRandom;
use regex::Regex;

pub const SAFETY_FLAG: &str = "safety_concern";

pub const SAFETY_RESPONSE: &str = "Escucho lo que me dices y me preocupo por ti. Si estas pensando en hacerte daño, por favor llama al 024 o al 112 ahora mismo. No estas solo/a. ¿Puedo ayudarte a encontrar recursos de ayuda?";

const RESPONSES: &[&str] = &[
    "Gracias por compartir eso conmigo. Lo que sientes tiene sentido dada la situación. ¿Quieres que exploremos alguna herramienta que pueda ayudarte ahora mismo?",
    "Escucho lo que me dices y quiero que sepas que no estás solo/a en esto. Vamos paso a paso. ¿Qué es lo que más te preocupa en este momento?",
    "Es valiente hablar de esto. A veces solo ponerlo en palabras ya ayuda un poco. ¿Cómo te sientes ahora mismo, del 1 al 10?",
    "Entiendo. Eso suena realmente difícil. Recuerda que no tienes que resolverlo todo ahora. ¿Te gustaría probar un ejercicio de respiración rapido?",
    "Lo que describes es una reacción normal ante una situación que no es normal. Tu malestar es válido. ¿Quieres que busquemos un siguiente paso juntos?",
];

static SAFETY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)hacerme da[ñn]o|suicid|morir|no puedo m[aá]s|want to die|kill myself|can[’']?t go on|end my life",
    )
    .expect("safety pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub safety_flags: Vec<String>,
}

pub trait Responder: Send + Sync {
    fn respond(&self, text: &str) -> Reply;
}

/// True when `text` contains self-harm language.
pub fn detects_safety_concern(text: &str) -> bool {
    SAFETY_PATTERN.is_match(text)
}

/// Canned responder: safety message on a keyword hit, otherwise a random
/// pick from a small pool of empathic replies.
#[derive(Debug, Default)]
pub struct MockResponder;

impl Responder for MockResponder {
    fn respond(&self, text: &str) -> Reply {
        if detects_safety_concern(text) {
            return Reply {
                content: SAFETY_RESPONSE.to_string(),
                safety_flags: vec![SAFETY_FLAG.to_string()],
            };
        }

        let content = RESPONSES.choose(&mut rand::rng()).copied().unwrap_or(RESPONSES[0]);
        Reply {
            content: content.to_string(),
            safety_flags: Vec::new(),
        }
    }
}
