//! Global reference data: calming tools, guidance scenarios and help resources.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use intus_types::models::{ResourceType, ScenarioType, ToolType};

struct ToolSeed {
    id: &'static str,
    title: &'static str,
    kind: ToolType,
    description: &'static str,
    duration_min: u32,
    steps: &'static [&'static str],
}

struct ScenarioSeed {
    id: &'static str,
    kind: ScenarioType,
    title: &'static str,
    description: &'static str,
    steps: &'static [&'static str],
    created_at: &'static str,
}

struct ResourceSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    kind: ResourceType,
    phone: Option<&'static str>,
    url: Option<&'static str>,
}

const TOOLS: &[ToolSeed] = &[
    ToolSeed {
        id: "t1",
        title: "Respiración 4-7-8",
        kind: ToolType::Breathing,
        description: "Técnica de respiración que activa el sistema nervioso parasimpático para calmarte rapidamente.",
        duration_min: 3,
        steps: &[
            "Siéntate cómodo y cierra los ojos.",
            "Inhala por la nariz contando hasta 4.",
            "Mantén el aire contando hasta 7.",
            "Exhala lentamente por la boca contando hasta 8.",
            "Repite el ciclo 4 veces.",
            "Nota como tu cuerpo se relaja con cada ciclo.",
        ],
    },
    ToolSeed {
        id: "t2",
        title: "Respiración cuadrada",
        kind: ToolType::Breathing,
        description: "Respiración en cuatro tiempos iguales, ideal para recuperar el control en momentos de ansiedad.",
        duration_min: 4,
        steps: &[
            "Inhala contando hasta 4.",
            "Mantén el aire contando hasta 4.",
            "Exhala contando hasta 4.",
            "Espera contando hasta 4 antes de volver a inhalar.",
            "Repite durante 4 minutos.",
        ],
    },
    ToolSeed {
        id: "t3",
        title: "Grounding 5-4-3-2-1",
        kind: ToolType::Grounding,
        description: "Técnica de anclaje sensorial que te trae al presente cuando la ansiedad te desconecta.",
        duration_min: 5,
        steps: &[
            "Nombra 5 cosas que puedas VER a tu alrededor.",
            "Nombra 4 cosas que puedas TOCAR.",
            "Nombra 3 cosas que puedas OIR.",
            "Nombra 2 cosas que puedas OLER.",
            "Nombra 1 cosa que puedas SABOREAR.",
            "Respira profundo. Ya estás aqui.",
        ],
    },
    ToolSeed {
        id: "t4",
        title: "Grounding con objetos",
        kind: ToolType::Grounding,
        description: "Usa un objeto físico para anclarte al presente y reducir la disociación.",
        duration_min: 3,
        steps: &[
            "Busca un objeto cercano (una taza, un bolígrafo, una piedra).",
            "Sostenlo con ambas manos.",
            "Observa su color, forma y textura.",
            "Siente su temperatura y peso.",
            "Describe en voz alta o mentalmente lo que percibes.",
            "Repite: 'Estoy aqui, estoy seguro/a'.",
        ],
    },
    ToolSeed {
        id: "t5",
        title: "Reencuadre cognitivo",
        kind: ToolType::Reframe,
        description: "Aprende a ver la situación desde otro ángulo para reducir el impacto emocional.",
        duration_min: 5,
        steps: &[
            "Escribe el pensamiento que te genera malestar.",
            "Preguntate: 'Es un hecho o una interpretación?'",
            "Busca evidencias a favor y en contra del pensamiento.",
            "Escribe una versión mas equilibrada del pensamiento.",
            "Lee la nueva versión en voz alta.",
            "Nota si tu nivel de malestar ha cambiado.",
        ],
    },
    ToolSeed {
        id: "t6",
        title: "Diálogo compasivo",
        kind: ToolType::SelfTalk,
        description: "Reemplaza la autocrítica por un diálogo interno amable, como si hablaras con un buen amigo.",
        duration_min: 4,
        steps: &[
            "Identifica el pensamiento autocrítico (ej: 'Soy un desastre').",
            "Imagina que un amigo querido te dice lo mismo sobre si mismo.",
            "Escribe lo que le dirías a ese amigo.",
            "Ahora dirige esas mismas palabras hacia ti.",
            "Repite: 'Merezco compasión, como cualquier persona'.",
        ],
    },
    ToolSeed {
        id: "t7",
        title: "Afirmaciones de seguridad",
        kind: ToolType::SelfTalk,
        description: "Frases que refuerzan tu sentido de seguridad y control cuando todo parece incierto.",
        duration_min: 3,
        steps: &[
            "Busca un lugar tranquilo.",
            "Repite en voz alta o mentalmente: 'Estoy a salvo en este momento'.",
            "'Puedo manejar las cosas paso a paso'.",
            "'No tengo que resolver todo ahora'.",
            "'Ya he superado momentos difíciles antes'.",
            "Respira profundo y continua con tu dia.",
        ],
    },
    ToolSeed {
        id: "t8",
        title: "Reencuadre del error",
        kind: ToolType::Reframe,
        description: "Transforma la experiencia de 'fallar' en una oportunidad de aprendizaje y crecimiento.",
        duration_min: 4,
        steps: &[
            "Describe brevemente la situación que consideras un error.",
            "Preguntate: 'Que aprendí de esto?'",
            "Preguntate: 'Que haría diferente la próxima vez?'",
            "Escribe una frase que resuma el aprendizaje.",
            "Recuerda: equivocarse es parte de ser humano.",
        ],
    },
];

const SCENARIOS: &[ScenarioSeed] = &[
    ScenarioSeed {
        id: "s1",
        kind: ScenarioType::BullyingSchool,
        title: "Bullying escolar: que hacer hoy",
        description: "Pasos concretos para protegerte y buscar ayuda si sufres acoso en el instituto.",
        steps: &[
            "Reconoce que no es tu culpa. Nadie merece ser tratado asi.",
            "Busca a una persona de confianza: un profesor, orientador o familiar.",
            "Cuenta lo que esta pasando con el máximo detalle que puedas.",
            "Registra los incidentes: fecha, hora, que paso, quien estaba presente.",
            "Evita estar solo/a en los lugares donde ocurre el acoso.",
            "Recuerda: pedir ayuda es un acto de valentía, no de debilidad.",
            "Si la situación es grave o hay violencia, llama al 112.",
        ],
        created_at: "2026-01-15T10:00:00Z",
    },
    ScenarioSeed {
        id: "s2",
        kind: ScenarioType::BullyingSchool,
        title: "Como apoyar a alguien que sufre bullying",
        description: "Guia para ser un buen apoyo cuando alguien cercano sufre acoso escolar.",
        steps: &[
            "Escucha sin juzgar. Simplemente di: 'Te creo y estoy contigo'.",
            "No le digas 'ignoralo' o 'no es para tanto'.",
            "Preguntale que necesita, no asumas.",
            "Acompanale a hablar con un adulto de confianza si quiere.",
            "Mantente presente: a veces solo necesita saber que no esta solo/a.",
            "Si ves una situación de acoso, no te quedes callado/a.",
        ],
        created_at: "2026-01-15T10:00:00Z",
    },
    ScenarioSeed {
        id: "s3",
        kind: ScenarioType::BullyingWork,
        title: "Bullying laboral: límites y documentación",
        description: "Estrategias para protegerte del acoso laboral y documentar lo que ocurre.",
        steps: &[
            "Identifica los comportamientos: humillaciones, aislamiento, sobrecarga, sabotaje.",
            "Registra cada incidente por escrito: fecha, hora, testigos, hechos.",
            "Guarda correos, mensajes y cualquier evidencia escrita.",
            "Busca apoyo: un compañero de confianza, el comité de empresa o RRHH.",
            "Practica respuestas asertivas: 'No me parece adecuado que me hables asi'.",
            "Consulta con un profesional (sindicato, abogado laboral) si la situación persiste.",
            "Cuida tu salud: el acoso laboral tiene impacto real en tu bienestar.",
        ],
        created_at: "2026-01-20T10:00:00Z",
    },
    ScenarioSeed {
        id: "s4",
        kind: ScenarioType::BullyingWork,
        title: "Preparar una conversación difícil en el trabajo",
        description: "Como plantear un problema de acoso o conflicto laboral de forma asertiva.",
        steps: &[
            "Elige el momento y lugar adecuados (privado, sin prisas).",
            "Prepara lo que quieres decir: hechos concretos, no generalizaciones.",
            "Usa frases en primera persona: 'Me siento... cuando... porque...'",
            "Escucha la respuesta sin interrumpir.",
            "Propone soluciones concretas: 'Me gustaría que...'",
            "Si no te sientes seguro/a, lleva a alguien de confianza contigo.",
        ],
        created_at: "2026-01-20T10:00:00Z",
    },
    ScenarioSeed {
        id: "s5",
        kind: ScenarioType::Anxiety,
        title: "Ansiedad: cuando empieza el bucle",
        description: "Pasos para interrumpir el ciclo de pensamientos ansiosos y volver al presente.",
        steps: &[
            "Para. Reconoce que estás en un bucle de ansiedad.",
            "Pon los pies en el suelo. Siente el contacto.",
            "Usa la técnica 5-4-3-2-1 para anclarte al presente.",
            "Preguntate: 'Esto que pienso, es real ahora mismo?'",
            "Respira: inhala 4 segundos, manten 4, exhala 4.",
            "Haz una sola cosa pequeña: un vaso de agua, un paso fuera.",
            "Si la ansiedad es frecuente o intensa, busca apoyo profesional.",
        ],
        created_at: "2026-01-25T10:00:00Z",
    },
    ScenarioSeed {
        id: "s6",
        kind: ScenarioType::Stress,
        title: "Estrés: descarga y planificación",
        description: "Estrategia para descargar el estrés acumulado y recuperar la sensación de control.",
        steps: &[
            "Escribe TODO lo que te agobia en una lista, sin filtro.",
            "Separa lo que puedes controlar de lo que no.",
            "De lo que puedes controlar, elige solo 1-2 cosas para hoy.",
            "Pon un temporizador de 25 minutos y trabaja en una sola tarea.",
            "Cuando suene, para y respira 2 minutos.",
            "Al final del dia, reconoce lo que hiciste, por pequeño que sea.",
            "Recuerda: no tienes que resolverlo todo hoy.",
        ],
        created_at: "2026-01-28T10:00:00Z",
    },
];

const RESOURCES: &[ResourceSeed] = &[
    ResourceSeed {
        id: "r1",
        title: "Emergencias",
        description: "Número de emergencias en España. Llama si estás en peligro inmediato.",
        kind: ResourceType::Emergency,
        phone: Some("112"),
        url: None,
    },
    ResourceSeed {
        id: "r2",
        title: "Linea 024",
        description: "Línea de atención a la conducta suicida, disponible 24 horas.",
        kind: ResourceType::Emergency,
        phone: Some("024"),
        url: None,
    },
    ResourceSeed {
        id: "r3",
        title: "Teléfono de la Esperanza",
        description: "Línea de ayuda emocional y prevención del suicidio.",
        kind: ResourceType::Professional,
        phone: Some("717 003 717"),
        url: None,
    },
    ResourceSeed {
        id: "r4",
        title: "Colegio Oficial de Psicólogos",
        description: "Busca un profesional de la psicología cerca de ti.",
        kind: ResourceType::Professional,
        phone: None,
        url: Some("https://www.cop.es"),
    },
    ResourceSeed {
        id: "r5",
        title: "Guia sobre acoso escolar (AEPAE)",
        description: "Información y recursos sobre bullying escolar.",
        kind: ResourceType::Education,
        phone: None,
        url: Some("https://aepae.es"),
    },
    ResourceSeed {
        id: "r6",
        title: "Guia sobre acoso laboral",
        description: "Información sobre mobbing y derechos laborales.",
        kind: ResourceType::Education,
        phone: None,
        url: Some("https://www.mites.gob.es"),
    },
];

pub(crate) fn seed_catalog(conn: &Connection) -> Result<()> {
    let mut inserted = 0;

    for tool in TOOLS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO tools (id, title, type, description, duration_min, steps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                tool.id,
                tool.title,
                tool.kind.as_str(),
                tool.description,
                tool.duration_min,
                serde_json::to_string(tool.steps)?,
            ],
        )?;
    }

    for scenario in SCENARIOS {
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(scenario.created_at)?.to_utc();
        inserted += conn.execute(
            "INSERT OR IGNORE INTO scenarios (id, type, title, description, steps, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                scenario.id,
                scenario.kind.as_str(),
                scenario.title,
                scenario.description,
                serde_json::to_string(scenario.steps)?,
                created_at,
            ],
        )?;
    }

    for resource in RESOURCES {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO resources (id, title, description, type, phone, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                resource.id,
                resource.title,
                resource.description,
                resource.kind.as_str(),
                resource.phone,
                resource.url,
            ],
        )?;
    }

    debug!("Catalog seed inserted {} new rows", inserted);
    Ok(())
}
