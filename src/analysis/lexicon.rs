//! Bilingual keyword, pattern and template tables.
//!
//! One [`Lexicon`] per [`Language`]. Both tables have the same shape so the
//! scorer never branches on language; it only looks up the table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language of the analyzed text and of the canned output strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[default]
    #[serde(rename = "id")]
    Indonesian,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Indonesian => "id",
        }
    }

    /// Keyword/pattern/template table for this language.
    pub fn lexicon(&self) -> &'static Lexicon {
        match self {
            Language::English => &ENGLISH,
            Language::Indonesian => &INDONESIAN,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::English),
            "id" | "ind" | "indonesian" | "bahasa" => Ok(Language::Indonesian),
            other => Err(format!("unknown language '{}' (expected 'en' or 'id')", other)),
        }
    }
}

/// A single risk keyword and its compiled word-boundary matcher.
pub struct Keyword {
    pub term: &'static str,
    regex: Regex,
}

impl Keyword {
    fn new(term: &'static str) -> Self {
        let body = regex::escape(term).replace(' ', r"\s+");
        let regex = Regex::new(&format!(r"(?i)\b{}\b", body)).expect("keyword regex is static");
        Self { term, regex }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Two risk terms appearing within a bounded distance, in either order.
pub struct Pattern {
    pub name: &'static str,
    regex: Regex,
}

impl Pattern {
    fn proximity(name: &'static str, first: &[&str], second: &[&str], distance: usize) -> Self {
        let a = alternation(first);
        let b = alternation(second);
        let regex = Regex::new(&format!(
            r"(?i)\b(?:{a})\b.{{0,{distance}}}\b(?:{b})\b|\b(?:{b})\b.{{0,{distance}}}\b(?:{a})\b"
        ))
        .expect("pattern regex is static");
        Self { name, regex }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn alternation(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|t| regex::escape(t).replace(' ', r"\s*"))
        .collect::<Vec<_>>()
        .join("|")
}

fn any_of(terms: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation(terms))).expect("term regex is static")
}

/// Canned output for one threat category.
pub struct Canned {
    pub threat_type: &'static str,
    pub recommendations: &'static [&'static str],
    pub analysis: &'static str,
}

/// All user-facing strings the local scorer can emit in one language.
pub struct Templates {
    pub safe: &'static [&'static str],
    pub safe_analysis: &'static str,
    pub medium: &'static [&'static str],
    pub medium_type: &'static str,
    pub medium_analysis: &'static str,
    pub financial: Canned,
    pub prize: Canned,
    pub general: Canned,
    pub degraded_type: &'static str,
    pub degraded: &'static [&'static str],
}

pub struct Lexicon {
    pub language: Language,
    /// High-frequency function words used for language detection.
    pub function_words: &'static [&'static str],
    pub high: Vec<Keyword>,
    pub medium: Vec<Keyword>,
    pub patterns: Vec<Pattern>,
    pub financial_terms: Regex,
    pub prize_terms: Regex,
    pub templates: &'static Templates,
}

/// Owned copy of a canned string list.
pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── English ─────────────────────────────────────────────────────────

const EN_FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "at", "is", "are", "was", "be",
    "you", "your", "this", "that", "for", "with", "from", "it", "we", "our", "please", "will",
    "have", "has", "not", "see",
];

const EN_HIGH: &[&str] = &[
    "password", "passcode", "pin", "credit card", "credit", "account", "bank", "transfer",
    "funds", "money", "pay", "payment", "send", "verify", "verification", "login", "log in",
    "sign in", "click", "link", "urgent", "immediately", "emergency", "deadline", "expires",
    "prize", "winner", "you won", "have won", "you've won", "lottery", "bitcoin", "crypto",
    "wallet", "gift card",
];

const EN_MEDIUM: &[&str] = &[
    "promo", "promotion", "discount", "free", "bonus", "offer", "limited", "this week",
    "today only", "exclusive", "opportunity", "investment", "profit", "income", "earnings",
    "cashback", "millions", "billions", "thousands",
];

static EN_TEMPLATES: Templates = Templates {
    safe: &[
        "Stay cautious with online content",
        "Always verify the sender or source of information",
    ],
    safe_analysis: "This text shows no significant threat indicators.",
    medium: &[
        "Be careful with this content",
        "Verify the information with official sources",
        "Do not share personal or financial information",
    ],
    medium_type: "potential scam",
    medium_analysis: "This text shows some suspicious indicators and deserves a closer look.",
    financial: Canned {
        threat_type: "financial phishing",
        recommendations: &[
            "Do not share financial or personal information",
            "Verify directly with the official institution through a trusted channel",
            "Report this message to the authorities",
        ],
        analysis: "This text asks for financial information in a suspicious way and is likely a phishing attempt.",
    },
    prize: Canned {
        threat_type: "prize scam",
        recommendations: &[
            "Ignore this message - legitimate prizes never ask for upfront fees",
            "Do not transfer money or share personal information",
            "Report it to the platform where you received this message",
        ],
        analysis: "This text offers a suspicious prize and is most likely a scam.",
    },
    general: Canned {
        threat_type: "general scam",
        recommendations: &[
            "Avoid interacting with this content",
            "Do not open any links or attachments",
            "Block the sender and report them to the relevant platform",
        ],
        analysis: "This text shows several scam indicators and should be avoided.",
    },
    degraded_type: "could not analyze",
    degraded: &[
        "Treat this content with caution",
        "Verify the information with official sources before acting on it",
    ],
};

static ENGLISH: Lazy<Lexicon> = Lazy::new(|| Lexicon {
    language: Language::English,
    function_words: EN_FUNCTION_WORDS,
    high: EN_HIGH.iter().map(|&t| Keyword::new(t)).collect(),
    medium: EN_MEDIUM.iter().map(|&t| Keyword::new(t)).collect(),
    patterns: vec![
        Pattern::proximity(
            "credential request",
            &["password", "passcode", "pin"],
            &["send", "enter", "provide", "share", "confirm"],
            30,
        ),
        Pattern::proximity(
            "bank verification",
            &["bank", "account", "credit card"],
            &["verify", "confirm", "update"],
            50,
        ),
        Pattern::proximity(
            "prize claim",
            &["you won", "have won", "you've won", "winner", "prize", "lottery"],
            &["claim", "collect", "redeem"],
            50,
        ),
        Pattern::proximity(
            "payment pressure",
            &["pay", "transfer", "send"],
            &["now", "immediately", "today"],
            30,
        ),
        Pattern::proximity("link lure", &["click", "open", "tap"], &["link", "url", "here"], 20),
    ],
    financial_terms: any_of(&["bank", "credit card", "debit card", "account number"]),
    prize_terms: any_of(&[
        "prize", "winner", "you won", "have won", "you've won", "lottery", "sweepstakes",
    ]),
    templates: &EN_TEMPLATES,
});

// ── Indonesian ──────────────────────────────────────────────────────

const ID_FUNCTION_WORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "untuk", "ini", "itu", "dengan", "tidak", "akan",
    "anda", "kami", "kita", "atau", "adalah", "pada", "juga", "sudah", "saya",
];

const ID_HIGH: &[&str] = &[
    "password", "kata sandi", "kredit", "kartu kredit", "rekening", "bank", "transfer", "dana",
    "uang", "bayar", "kirim", "verifikasi", "akun", "login", "masuk", "klik", "tautan", "link",
    "mendesak", "segera", "darurat", "batas waktu", "deadline", "hadiah", "menang", "undian",
    "lotere", "bitcoin", "crypto", "wallet",
];

const ID_MEDIUM: &[&str] = &[
    "promo", "diskon", "gratis", "free", "bonus", "penawaran", "terbatas", "limited",
    "kesempatan", "opportunity", "investasi", "keuntungan", "profit", "penghasilan", "income",
    "jutaan", "milyaran", "ratusan", "ribuan",
];

static ID_TEMPLATES: Templates = Templates {
    safe: &[
        "Tetap berhati-hati dengan konten online",
        "Selalu verifikasi pengirim atau sumber informasi",
    ],
    safe_analysis: "Teks ini tidak menunjukkan indikator ancaman yang signifikan.",
    medium: &[
        "Berhati-hatilah dengan konten ini",
        "Verifikasi keaslian informasi dari sumber resmi",
        "Jangan memberikan informasi pribadi atau keuangan",
    ],
    medium_type: "potensi penipuan",
    medium_analysis: "Teks ini menunjukkan beberapa indikator yang mencurigakan dan perlu diperiksa lebih lanjut.",
    financial: Canned {
        threat_type: "phishing keuangan",
        recommendations: &[
            "Jangan memberikan informasi keuangan atau pribadi",
            "Verifikasi langsung dengan pihak resmi melalui saluran yang terpercaya",
            "Laporkan pesan ini ke pihak berwenang",
        ],
        analysis: "Teks ini berisi permintaan informasi keuangan yang mencurigakan dan mungkin merupakan upaya phishing.",
    },
    prize: Canned {
        threat_type: "penipuan hadiah",
        recommendations: &[
            "Abaikan pesan ini - hadiah yang sah tidak meminta biaya di muka",
            "Jangan transfer uang atau memberikan informasi pribadi",
            "Laporkan ke platform tempat Anda menerima pesan ini",
        ],
        analysis: "Teks ini berisi penawaran hadiah yang mencurigakan dan kemungkinan besar merupakan penipuan.",
    },
    general: Canned {
        threat_type: "penipuan umum",
        recommendations: &[
            "Hindari berinteraksi dengan konten ini",
            "Jangan membuka tautan atau lampiran apa pun",
            "Blokir pengirim dan laporkan ke platform terkait",
        ],
        analysis: "Teks ini menunjukkan beberapa indikator penipuan dan sebaiknya dihindari.",
    },
    degraded_type: "tidak dapat dianalisis",
    degraded: &[
        "Perlakukan konten ini dengan hati-hati",
        "Verifikasi informasi dari sumber resmi sebelum bertindak",
    ],
};

static INDONESIAN: Lazy<Lexicon> = Lazy::new(|| Lexicon {
    language: Language::Indonesian,
    function_words: ID_FUNCTION_WORDS,
    high: ID_HIGH.iter().map(|&t| Keyword::new(t)).collect(),
    medium: ID_MEDIUM.iter().map(|&t| Keyword::new(t)).collect(),
    patterns: vec![
        Pattern::proximity(
            "permintaan kredensial",
            &["password", "kata sandi", "pin"],
            &["kirim", "berikan", "masukkan"],
            30,
        ),
        Pattern::proximity(
            "verifikasi bank",
            &["bank", "rekening", "kartu kredit"],
            &["verifikasi", "konfirmasi"],
            50,
        ),
        Pattern::proximity(
            "klaim hadiah",
            &["menang", "hadiah", "undian"],
            &["klaim", "ambil", "dapatkan"],
            50,
        ),
        Pattern::proximity(
            "desakan pembayaran",
            &["bayar", "transfer"],
            &["sekarang", "segera", "hari ini"],
            30,
        ),
        Pattern::proximity("umpan tautan", &["klik", "buka"], &["link", "tautan", "url"], 20),
    ],
    financial_terms: any_of(&["bank", "rekening", "kartu kredit"]),
    prize_terms: any_of(&["hadiah", "menang", "undian", "lotere"]),
    templates: &ID_TEMPLATES,
});
