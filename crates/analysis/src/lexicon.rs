//! Spanish negotiation lexicon
//!
//! Fixed substring lists backing keyword detection, sentiment buckets and
//! register detection. Matching is done on lowercased input, so every entry
//! here is lowercase. Multi-word entries match as phrases.

/// Discount / debt-reduction vocabulary
pub const DISCOUNT: &[&str] = &[
    "descuento",
    "rebaja",
    "quita",
    "reduccion",
    "reducción",
    "pagar menos",
];

/// Installment vocabulary
pub const INSTALLMENTS: &[&str] = &[
    "cuotas",
    "cuota",
    "mensualidades",
    "mensualidad",
    "en partes",
    "pagos parciales",
];

/// Time-extension vocabulary
pub const TIME: &[&str] = &[
    "tiempo",
    "plazo",
    "meses",
    "mes",
    "prorroga",
    "prórroga",
    "mas adelante",
    "más adelante",
    "esperar",
];

/// Explicit human-representative requests
pub const HUMAN: &[&str] = &[
    "humano",
    "persona",
    "agente",
    "representante",
    "asesor",
    "operador",
    "alguien real",
    "hablar con alguien",
];

/// Payment vocabulary
pub const PAYMENT: &[&str] = &[
    "pago",
    "pagar",
    "abonar",
    "transferencia",
    "deposito",
    "depósito",
    "liquidar",
];

/// Financial-distress vocabulary. Checked before agreement when bucketing
/// sentiment: a distressed message that also thanks the agent is negative.
pub const DISTRESS: &[&str] = &[
    "no puedo pagar",
    "no puedo",
    "no tengo dinero",
    "no tengo trabajo",
    "sin trabajo",
    "desempleado",
    "desempleada",
    "crisis",
    "dificil",
    "difícil",
    "enfermedad",
    "no me alcanza",
];

/// Agreement / gratitude vocabulary
pub const AGREEMENT: &[&str] = &[
    "de acuerdo",
    "acepto",
    "esta bien",
    "está bien",
    "me parece bien",
    "perfecto",
    "gracias",
    "excelente",
    "vale",
];

/// Formal-register markers used for communication-style detection
pub const FORMAL_MARKERS: &[&str] = &[
    "usted",
    "estimado",
    "estimada",
    "cordialmente",
    "atentamente",
    "quisiera",
    "podria",
    "podría",
    "agradezco",
];

/// Informal-register markers used for communication-style detection
pub const INFORMAL_MARKERS: &[&str] = &[
    "hola",
    "oye",
    "dale",
    "porfa",
    "bro",
    "che",
    "va que va",
    "ok",
];

/// Whether any lexicon phrase occurs in the (already lowercased) text
pub fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Count how many lexicon phrases occur in the (already lowercased) text
pub fn count_matches(text: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|phrase| text.contains(*phrase)).count()
}
