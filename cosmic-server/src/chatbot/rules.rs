//! Rule-based replies
//!
//! Menu commands are matched against the whole message. Keyword rules are
//! tried in order and match on word boundaries, so "hi" does not fire on
//! "this". A message nothing matches gets a general astrology reply when it
//! mentions an astrology term, else the default reply.

use super::context::ChatContext;
use maud::{html, Markup};

/// Reply that tells the frontend to open its booking form
pub const SHOW_BOOKING_FORM: &str = "SHOW_BOOKING_FORM";

/// Lowercased message as space-padded word sequence (" what s my sun sign ")
#[derive(Debug, Clone)]
pub struct Words(String);

impl Words {
    pub fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        Self(format!(" {} ", words.join(" ")))
    }

    /// Whole-word (or whole-phrase) containment
    pub fn has(&self, phrase: &str) -> bool {
        let phrase = Words::new(phrase);
        !phrase.0.trim().is_empty() && self.0.contains(&phrase.0)
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }

    pub fn has_all(&self, phrases: &[&str]) -> bool {
        phrases.iter().all(|p| self.has(p))
    }
}

enum Trigger {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
}

impl Trigger {
    fn fires(&self, words: &Words) -> bool {
        match self {
            Trigger::Any(phrases) => words.has_any(phrases),
            Trigger::All(phrases) => words.has_all(phrases),
        }
    }
}

enum Answer {
    Text(&'static str),
    Built(fn(&ChatContext) -> Markup),
}

struct Rule {
    topic: &'static str,
    triggers: &'static [Trigger],
    unless: &'static [&'static str],
    answer: Answer,
}

impl Rule {
    fn matches(&self, words: &Words) -> bool {
        !words.has_any(self.unless) && self.triggers.iter().any(|t| t.fires(words))
    }
}

/// Outcome of rule matching
#[derive(Debug, Clone, PartialEq)]
pub enum RuleReply {
    /// A command or keyword rule answered the message
    Specific { topic: &'static str, text: String },
    /// Astrology term present but no rule matched
    GeneralAstrology(String),
    Default(String),
}

impl RuleReply {
    /// An LLM may answer better than the general replies
    pub fn is_specific(&self) -> bool {
        matches!(self, RuleReply::Specific { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            RuleReply::Specific { text, .. } => text,
            RuleReply::GeneralAstrology(text) | RuleReply::Default(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            RuleReply::Specific { text, .. } => text,
            RuleReply::GeneralAstrology(text) | RuleReply::Default(text) => text,
        }
    }
}

pub fn reply(message: &str, context: &ChatContext) -> RuleReply {
    let command = message.trim().to_lowercase();
    if let Some(text) = command_reply(&command, context) {
        return RuleReply::Specific {
            topic: "command",
            text,
        };
    }

    let words = Words::new(message);
    if let Some(rule) = RULES.iter().find(|r| r.matches(&words)) {
        let text = match &rule.answer {
            Answer::Text(text) => text.to_string(),
            Answer::Built(build) => build(context).into_string(),
        };
        return RuleReply::Specific {
            topic: rule.topic,
            text,
        };
    }

    if words.has_any(ASTROLOGY_TERMS) {
        RuleReply::GeneralAstrology(GENERAL_ASTROLOGY.to_string())
    } else {
        RuleReply::Default(default_reply(context).into_string())
    }
}

// ============================================================================
// Menu commands
// ============================================================================

fn command_reply(command: &str, context: &ChatContext) -> Option<String> {
    let markup = match command {
        "services" => services_reply(context),
        "book" => return Some(SHOW_BOOKING_FORM.to_string()),
        "hours" => hours_reply(context),
        "location" => location_reply(context),
        "contact" => contact_reply(context),
        "social" => social_reply(context),
        "qa" | "faq" => return Some(FAQ.to_string()),
        _ => return None,
    };
    Some(markup.into_string())
}

fn services_reply(context: &ChatContext) -> Markup {
    html! {
        strong { "Our Astrological Services" } br; br;
        @if context.astrological_services.is_empty() {
            "Palmistry, face reading, horoscope analysis, vastu, numerology and gemstone consultations." br;
        } @else {
            @for service in &context.astrological_services {
                "• " strong { (service.title) }
                @if let Some(description) = &service.description { " - " (description) }
                br;
            }
        }
        br;
        "Would you like to book a consultation?"
    }
}

fn hours_reply(context: &ChatContext) -> Markup {
    html! {
        strong { "Our Business Hours" } br; br;
        (context.business.hours()) br; br;
        em { "Consultations are available during these hours. WhatsApp us anytime for quick questions." }
    }
}

fn location_reply(context: &ChatContext) -> Markup {
    let business = &context.business;
    html! {
        strong { "Visit Us" } br; br;
        strong { "Address:" } br;
        (business.address.as_deref().unwrap_or("Contact us for our location")) br;
        @if let Some(phone) = &business.phone {
            br; "Call us for directions: " strong { (phone) } br;
        }
        @if let Some(url) = &business.google_location_url {
            br; a href=(url) target="_blank" { "View on Google Maps" }
        }
    }
}

fn contact_reply(context: &ChatContext) -> Markup {
    let business = &context.business;
    html! {
        strong { "Get In Touch" } br; br;
        strong { "Phone:" } " " (business.phone.as_deref().unwrap_or("Not available")) br;
        strong { "Email:" } " " (business.email.as_deref().unwrap_or("Not available")) br;
        strong { "WhatsApp:" } " "
        @if business.whatsapp().is_some() { "Use the WhatsApp button below" } @else { "Not available" }
        br; br;
        em { "We're here to guide your cosmic journey." }
    }
}

fn social_reply(context: &ChatContext) -> Markup {
    let business = &context.business;
    let links = [
        ("Facebook", &business.facebook),
        ("Instagram", &business.instagram),
        ("Twitter", &business.twitter),
    ];
    let any = links.iter().any(|(_, url)| url.is_some());
    html! {
        strong { "Follow Us" } br; br;
        @for (label, url) in links {
            @if let Some(url) = url {
                strong { (label) ":" } " " a href=(url) target="_blank" { "Visit" } br;
            }
        }
        @if !any { "Contact us for our social media links." br; }
        br; em { "Follow along for daily horoscopes and cosmic insights." }
    }
}

const FAQ: &str = "<strong>Frequently Asked Questions</strong><br><br>\
<strong>How accurate is astrology?</strong><br>\
Astrology offers insight from planetary positions and traditional knowledge. Results vary from person to person.<br><br>\
<strong>What do I need for a reading?</strong><br>\
Your date, time and place of birth.<br><br>\
<strong>How long is a consultation?</strong><br>\
Most sessions take 45 to 60 minutes.<br><br>\
<em>Ask me anything else you'd like to know.</em>";

// ============================================================================
// Keyword rules
// ============================================================================

fn greeting_reply(context: &ChatContext) -> Markup {
    html! {
        strong { "Namaste! Welcome to " (context.business.name()) } br; br;
        "I can help you with:" br;
        "• Our services" br;
        "• Booking a consultation" br;
        "• Contact details" br; br;
        em { "Type \"menu\" to see every option." }
    }
}

fn pricing_reply(context: &ChatContext) -> Markup {
    html! {
        strong { "Consultation Pricing" } br; br;
        "Fees depend on the service and the length of the session." br; br;
        strong { "For exact pricing:" } br;
        "• Call us: " (context.business.phone.as_deref().unwrap_or("Contact us")) br;
        "• Message us on WhatsApp for a quick quote" br;
        "• Book a consultation to discuss your needs" br; br;
        em { "First-time clients may receive special offers." }
    }
}

const MENU: &str = "<strong>How Can I Help You?</strong><br><br>\
<strong>Services</strong> - our astrological services<br>\
<strong>Book</strong> - schedule a consultation<br>\
<strong>Hours</strong> - when we are open<br>\
<strong>Location</strong> - how to find us<br>\
<strong>Contact</strong> - phone, email and WhatsApp<br>\
<strong>Social</strong> - follow us online<br>\
<strong>FAQ</strong> - common questions<br><br>\
<em>Pick an option or type your question.</em>";

const THANKS: &str = "<strong>You're most welcome!</strong><br><br>\
Glad I could help. Is there anything else you'd like to know?<br><br>\
<em>May the stars guide you.</em>";

const SUN_SIGN: &str = "<strong>Sun Sign</strong><br><br>\
Your sun sign is the zodiac sign the Sun occupied when you were born. \
It describes your core identity, ego and vitality. Western astrology uses the tropical zodiac, \
Vedic astrology the sidereal one, so the two can differ by a sign.<br><br>\
<em>Share your birth date and we can tell you yours.</em>";

const MOON_SIGN: &str = "<strong>Moon Sign (Rashi)</strong><br><br>\
Your moon sign is where the Moon stood at your birth. Vedic astrology treats it as the key to \
your mind, emotions and instincts, and most predictions are read from it.<br><br>\
<em>An exact birth time is needed, as the Moon changes sign every two and a half days.</em>";

const ZODIAC: &str = "<strong>Zodiac Signs</strong><br><br>\
The twelve signs are Aries, Taurus, Gemini, Cancer, Leo, Virgo, Libra, Scorpio, Sagittarius, \
Capricorn, Aquarius and Pisces. Each belongs to one of the four elements (fire, earth, air, water) \
and colours the planets that sit in it.<br><br>\
<em>Book a reading to see how the signs shape your chart.</em>";

const BIRTH_CHART: &str = "<strong>Birth Chart (Janam Kundali)</strong><br><br>\
A birth chart maps the sky at the exact moment and place of your birth: the twelve houses, \
the signs on them and the planets inside them. It is the foundation of every astrological reading.<br><br>\
<em>We need your date, time and place of birth to prepare it.</em>";

const ASCENDANT: &str = "<strong>Ascendant (Lagna)</strong><br><br>\
The ascendant is the sign rising on the eastern horizon when you were born. It sets the first \
house of the chart and shapes your personality, appearance and approach to life.<br><br>\
<em>It changes roughly every two hours, so birth time matters.</em>";

const PLANETS: &str = "<strong>Planets in Astrology (Navagraha)</strong><br><br>\
Vedic astrology works with nine grahas: Sun, Moon, Mars, Mercury, Jupiter, Venus, Saturn, \
Rahu and Ketu. Each governs different areas of life, and their placement in your chart shows \
where their influence falls.";

const MERCURY: &str = "<strong>Mercury (Budh)</strong><br><br>\
Mercury rules intellect, speech, communication, trade and learning. A strong Mercury gives a \
sharp mind and skill with words and numbers.";

const VENUS: &str = "<strong>Venus (Shukra)</strong><br><br>\
Venus governs love, marriage, beauty, art and comfort. Its placement shows how you relate to \
partners and what brings you pleasure.";

const MARS: &str = "<strong>Mars (Mangal)</strong><br><br>\
Mars stands for energy, courage, ambition and property. It drives action, and when afflicted can \
bring conflict or impatience.";

const JUPITER: &str = "<strong>Jupiter (Guru / Brihaspati)</strong><br><br>\
Jupiter is the great benefic: wisdom, teachers, children, wealth and fortune. Its blessings \
support growth in whatever house it occupies.";

const SATURN: &str = "<strong>Saturn (Shani)</strong><br><br>\
Saturn represents discipline, hard work, time and karma. Its periods such as Sade Sati test \
patience but reward sustained effort.";

const RAHU: &str = "<strong>Rahu (North Node)</strong><br><br>\
Rahu is a shadow planet of desire, ambition and the unconventional. It amplifies whatever it \
touches and often marks areas of sudden change.";

const KETU: &str = "<strong>Ketu (South Node)</strong><br><br>\
Ketu is the shadow planet of detachment, spirituality and past-life karma. It can bring \
insight while loosening worldly attachments.";

const HOUSES: &str = "<strong>Houses (Bhavas)</strong><br><br>\
The chart is divided into twelve houses, each ruling an area of life: self, wealth, siblings, \
home, children, health, marriage, transformation, fortune, career, gains and losses. \
Planets in a house bring their nature to that area.";

const MANGAL_DOSHA: &str = "<strong>Mangal Dosha (Manglik)</strong><br><br>\
Mangal dosha arises when Mars sits in the 1st, 2nd, 4th, 7th, 8th or 12th house. It is mostly \
considered for marriage compatibility, and its effect can be reduced by matching and remedies.<br><br>\
<em>We can check your chart and suggest remedies.</em>";

const DOSHA: &str = "<strong>Doshas</strong><br><br>\
A dosha is an unfavourable combination in the birth chart, such as Mangal dosha, Kaal Sarp dosha \
or Pitra dosha. Most doshas can be eased with poojas, mantras, gemstones or charity.<br><br>\
<em>Book a consultation to check your chart for doshas.</em>";

const DAILY_HOROSCOPE: &str = "<strong>Daily Horoscope</strong><br><br>\
Daily horoscopes read the day's planetary transits against your moon sign. They give a general \
trend; a personal reading from your full chart is far more precise.";

const KUNDALI_MATCHING: &str = "<strong>Kundali Matching (Guna Milan)</strong><br><br>\
Before marriage the two birth charts are compared across 36 gunas (Ashtakoot). A score of 18 or \
more is considered acceptable. We also check for Mangal dosha and other compatibility factors.<br><br>\
<em>Send both sets of birth details to get started.</em>";

const HOROSCOPE: &str = "<strong>Horoscope / Kundali</strong><br><br>\
Your horoscope is a complete reading of your birth chart: personality, career, relationships, \
health and the timing of major events through the dasha system.<br><br>\
<em>Book a detailed kundali analysis with our astrologers.</em>";

const NAKSHATRA: &str = "<strong>Nakshatras</strong><br><br>\
The zodiac is divided into 27 lunar mansions called nakshatras. Your birth nakshatra, where the \
Moon stood at birth, shapes temperament and decides the starting dasha of your life.";

const GEMSTONES: &str = "<strong>Gemstones (Ratnas)</strong><br><br>\
Each planet has a gemstone that strengthens its influence: ruby for the Sun, pearl for the Moon, \
red coral for Mars, emerald for Mercury, yellow sapphire for Jupiter, diamond for Venus and blue \
sapphire for Saturn.<br><br>\
<em>Always wear a gemstone only after a chart consultation.</em>";

const REMEDIES: &str = "<strong>Astrological Remedies</strong><br><br>\
Remedies ease difficult planetary influences: mantras, poojas and homams, gemstones, fasting, \
charity and yantras. The right remedy depends on your chart.<br><br>\
<em>Ask us for remedies suited to you.</em>";

const CAREER: &str = "<strong>Career & Business Astrology</strong><br><br>\
The 10th house, its lord and your current dasha show career direction, promotions, job changes \
and business prospects.<br><br>\
<em>Book a career consultation for guidance on your next move.</em>";

const MARRIAGE: &str = "<strong>Love & Marriage Astrology</strong><br><br>\
The 7th house, Venus and Jupiter show relationship patterns, marriage timing and compatibility. \
We also help with delayed marriage and relationship problems.<br><br>\
<em>Kundali matching is available for couples.</em>";

const HEALTH: &str = "<strong>Health Astrology</strong><br><br>\
The 6th and 8th houses and the ascendant indicate health tendencies and periods that need care. \
Astrology complements medical advice and never replaces it.";

const RETROGRADE: &str = "<strong>Retrograde Planets (Vakri)</strong><br><br>\
A planet is retrograde when it appears to move backwards from Earth. Its themes turn inward: \
a time to review and revisit rather than start fresh.";

const TRANSIT: &str = "<strong>Planetary Transits (Gochar)</strong><br><br>\
Transits are the current movements of the planets measured against your birth chart. Saturn and \
Jupiter transits in particular mark major phases of life.";

const LUCKY_NUMBER: &str = "<strong>Lucky Numbers</strong><br><br>\
Numerology derives your lucky numbers from your birth date and name. They can guide choices \
such as dates, names and addresses.";

const SCIENTIFIC: &str = "<strong>Is Astrology Scientific?</strong><br><br>\
Astrology is a traditional system of knowledge rather than an experimental science. Many people \
find its guidance meaningful for self-understanding and for timing decisions.";

const ASTROLOGY_MEANING: &str = "<strong>What is Astrology?</strong><br><br>\
Astrology studies the positions of the planets and stars and relates them to events and \
character on Earth. Vedic astrology (Jyotish) is one of its oldest traditions.";

const POOJA: &str = "<strong>Pooja & Ritual Services</strong><br><br>\
We perform poojas, homams and rituals for peace, prosperity, health and dosha relief, \
conducted by experienced priests.<br><br>\
<em>See our pooja services page or book directly.</em>";

const VASTU: &str = "<strong>Vastu Consultation</strong><br><br>\
Vastu Shastra aligns homes and workplaces with natural energies. We review layouts and suggest \
corrections, often without structural changes.";

const PREDICTIONS: &str = "<strong>Future Predictions</strong><br><br>\
Your chart and dasha periods show the themes coming up in career, relationships, health and \
finances, and when they are likely to unfold.";

const MUHURAT: &str = "<strong>Auspicious Timing (Muhurat)</strong><br><br>\
We pick favourable dates and times for weddings, house warming, business openings, vehicle \
purchases and other important beginnings.";

const CHILD: &str = "<strong>Children & Baby Names</strong><br><br>\
We help with childbirth timing, child horoscopes and auspicious baby names based on the birth \
nakshatra.";

const WEALTH: &str = "<strong>Wealth & Finance</strong><br><br>\
The 2nd and 11th houses show income and gains. We look at favourable periods for investment \
and remedies for financial obstacles.";

const EDUCATION: &str = "<strong>Education & Exams</strong><br><br>\
Mercury, Jupiter and the 4th and 5th houses reflect learning. We advise on suitable fields of \
study and favourable periods for exams.";

const TRAVEL: &str = "<strong>Foreign Travel & Settlement</strong><br><br>\
The 9th and 12th houses show travel and settlement abroad. We look at visa timing and the \
prospects of working or living overseas.";

const LEGAL: &str = "<strong>Legal Matters</strong><br><br>\
Astrology can indicate favourable periods for court cases and disputes, along with remedies \
to support a good outcome.";

const NAMING: &str = "<strong>Name Analysis</strong><br><br>\
We offer name numerology, lucky name suggestions, name corrections and business name \
selection.";

const INFORMATION_NEEDED: &str = "<strong>What We Need For a Reading</strong><br><br>\
• Full name<br>\
• Date of birth<br>\
• Exact time of birth<br>\
• Place of birth (city and country)<br><br>\
<em>Accurate birth details give accurate predictions.</em>";

const DURATION: &str = "<strong>Consultation Length</strong><br><br>\
• Basic reading: 30 to 45 minutes<br>\
• Detailed analysis: 60 to 90 minutes<br>\
• Kundali matching: 45 to 60 minutes<br>\
• Poojas: 1 to 3 hours";

const TIMING: &str = "<strong>Timing & Dasha Predictions</strong><br><br>\
The dasha system shows when events are likely: marriage, job changes, business ventures and \
major purchases. Good timing makes a real difference.";

const ONLINE: &str = "<strong>Online Consultations</strong><br><br>\
Yes, we consult over phone, WhatsApp voice and video calls, and Zoom or Google Meet, so you can \
get guidance from anywhere.";

const GENERAL_ASTROLOGY: &str = "<strong>Thank you for your astrology question!</strong><br><br>\
You can ask me about zodiac signs, planets, houses, birth charts, kundali matching, doshas, \
remedies and gemstones.<br><br>\
<em>For a personal answer, book a consultation with our astrologers.</em>";

fn default_reply(context: &ChatContext) -> Markup {
    let business = &context.business;
    html! {
        strong { "Thank you for your message!" } br; br;
        "Here's how I can assist you:" br;
        "• Type \"services\" to see what we offer" br;
        "• Type \"book\" to schedule a consultation" br;
        "• Ask about zodiac signs, planets, doshas or remedies" br; br;
        @if let Some(phone) = &business.phone { "Call us: " strong { (phone) } br; }
        @if let Some(whatsapp) = business.whatsapp() { "WhatsApp: " strong { (whatsapp) } br; }
    }
}

/// Terms that mark an unmatched message as an astrology question
const ASTROLOGY_TERMS: &[&str] = &[
    "astrology", "astrological", "horoscope", "kundali", "kundli", "zodiac", "planet", "planets",
    "dosha", "gemstone", "remedy", "pooja", "vastu", "nakshatra", "rashi", "dasha", "transit",
    "birth", "chart", "matching", "sun", "moon",
];

const SIGNS: &[&str] = &[
    "zodiac", "rashi", "rashis", "aries", "taurus", "gemini", "cancer", "leo", "virgo", "libra",
    "scorpio", "sagittarius", "capricorn", "aquarius", "pisces",
];

static RULES: &[Rule] = &[
    Rule {
        topic: "greeting",
        triggers: &[Trigger::Any(&["hello", "hi", "hey", "namaste", "namaskar"])],
        unless: &[],
        answer: Answer::Built(greeting_reply),
    },
    Rule {
        topic: "menu",
        triggers: &[Trigger::Any(&["menu", "help", "options"])],
        unless: &[],
        answer: Answer::Text(MENU),
    },
    Rule {
        topic: "pricing",
        triggers: &[Trigger::Any(&["price", "prices", "pricing", "cost", "fee", "fees", "charge", "charges", "how much"])],
        unless: &[],
        answer: Answer::Built(pricing_reply),
    },
    Rule {
        topic: "thanks",
        triggers: &[Trigger::Any(&["thank", "thanks", "thankyou"])],
        unless: &[],
        answer: Answer::Text(THANKS),
    },
    Rule {
        topic: "sun-sign",
        triggers: &[
            Trigger::Any(&["sun sign", "sunsign"]),
            Trigger::All(&["sun", "sign"]),
            Trigger::All(&["sun", "rashi"]),
        ],
        unless: &[],
        answer: Answer::Text(SUN_SIGN),
    },
    Rule {
        topic: "moon-sign",
        triggers: &[
            Trigger::Any(&["moon sign", "moonsign"]),
            Trigger::All(&["moon", "sign"]),
            Trigger::All(&["moon", "rashi"]),
        ],
        unless: &[],
        answer: Answer::Text(MOON_SIGN),
    },
    Rule {
        topic: "ascendant",
        triggers: &[Trigger::Any(&["ascendant", "rising sign", "rising", "lagna"])],
        unless: &[],
        answer: Answer::Text(ASCENDANT),
    },
    Rule {
        topic: "zodiac",
        triggers: &[Trigger::Any(SIGNS), Trigger::All(&["what", "sign"])],
        unless: &[],
        answer: Answer::Text(ZODIAC),
    },
    Rule {
        topic: "birth-chart",
        triggers: &[
            Trigger::Any(&["birth chart", "birthchart", "janam kundli", "janam kundali"]),
            Trigger::All(&["birth", "chart"]),
        ],
        unless: &[],
        answer: Answer::Text(BIRTH_CHART),
    },
    Rule {
        topic: "planets",
        triggers: &[
            Trigger::Any(&["navagraha", "nine planets", "planets in astrology"]),
            Trigger::All(&["planets", "astrology"]),
            Trigger::All(&["how many", "planets"]),
        ],
        unless: &[],
        answer: Answer::Text(PLANETS),
    },
    Rule {
        topic: "retrograde",
        triggers: &[Trigger::Any(&["retrograde", "vakri", "vakra"])],
        unless: &[],
        answer: Answer::Text(RETROGRADE),
    },
    Rule {
        topic: "mercury",
        triggers: &[Trigger::Any(&["mercury", "budh", "budha"])],
        unless: &[],
        answer: Answer::Text(MERCURY),
    },
    Rule {
        topic: "venus",
        triggers: &[Trigger::Any(&["venus", "shukra"])],
        unless: &[],
        answer: Answer::Text(VENUS),
    },
    Rule {
        topic: "mangal-dosha",
        triggers: &[
            Trigger::Any(&["mangal dosha", "mangal dosh", "manglik", "mangalik"]),
            Trigger::All(&["mars", "dosha"]),
            Trigger::All(&["mangal", "dosha"]),
        ],
        unless: &[],
        answer: Answer::Text(MANGAL_DOSHA),
    },
    Rule {
        topic: "mars",
        triggers: &[Trigger::Any(&["mars", "mangal", "mangala"])],
        unless: &[],
        answer: Answer::Text(MARS),
    },
    Rule {
        topic: "jupiter",
        triggers: &[Trigger::Any(&["jupiter", "guru", "brihaspati"])],
        unless: &[],
        answer: Answer::Text(JUPITER),
    },
    Rule {
        topic: "saturn",
        triggers: &[Trigger::Any(&["saturn", "shani", "sade sati"])],
        unless: &[],
        answer: Answer::Text(SATURN),
    },
    Rule {
        topic: "rahu",
        triggers: &[Trigger::Any(&["rahu"])],
        unless: &[],
        answer: Answer::Text(RAHU),
    },
    Rule {
        topic: "ketu",
        triggers: &[Trigger::Any(&["ketu"])],
        unless: &[],
        answer: Answer::Text(KETU),
    },
    Rule {
        topic: "houses",
        triggers: &[
            Trigger::Any(&["bhava", "bhavas", "houses in astrology"]),
            Trigger::All(&["houses", "astrology"]),
            Trigger::All(&["what", "houses"]),
        ],
        unless: &[],
        answer: Answer::Text(HOUSES),
    },
    Rule {
        topic: "dosha",
        triggers: &[Trigger::All(&["what", "dosha"]), Trigger::All(&["dosha", "meaning"])],
        unless: &["remedy", "remedies"],
        answer: Answer::Text(DOSHA),
    },
    Rule {
        topic: "daily-horoscope",
        triggers: &[Trigger::Any(&[
            "daily horoscope",
            "today horoscope",
            "today s horoscope",
            "todays horoscope",
        ])],
        unless: &[],
        answer: Answer::Text(DAILY_HOROSCOPE),
    },
    Rule {
        topic: "kundali-matching",
        triggers: &[
            Trigger::Any(&["gun milan", "guna milan", "marriage matching", "compatibility", "horoscope matching"]),
            Trigger::All(&["kundali", "match"]),
            Trigger::All(&["kundali", "matching"]),
            Trigger::All(&["kundli", "match"]),
            Trigger::All(&["kundli", "matching"]),
        ],
        unless: &[],
        answer: Answer::Text(KUNDALI_MATCHING),
    },
    Rule {
        topic: "horoscope",
        triggers: &[Trigger::Any(&["horoscope", "horoscopes", "kundali", "kundli", "rashifal", "rashi phal"])],
        unless: &[],
        answer: Answer::Text(HOROSCOPE),
    },
    Rule {
        topic: "nakshatra",
        triggers: &[Trigger::Any(&["nakshatra", "nakshatras", "nakshatram"])],
        unless: &[],
        answer: Answer::Text(NAKSHATRA),
    },
    Rule {
        topic: "gemstones",
        triggers: &[Trigger::Any(&["gemstone", "gemstones", "ratna", "ratnas", "stone", "stones"])],
        unless: &[],
        answer: Answer::Text(GEMSTONES),
    },
    Rule {
        topic: "remedies",
        triggers: &[Trigger::Any(&["remedy", "remedies", "parihara", "upay", "dosha"])],
        unless: &[],
        answer: Answer::Text(REMEDIES),
    },
    Rule {
        topic: "transit",
        triggers: &[Trigger::Any(&["transit", "transits", "gochar", "gochara"])],
        unless: &[],
        answer: Answer::Text(TRANSIT),
    },
    Rule {
        topic: "lucky-number",
        triggers: &[Trigger::Any(&["lucky number", "lucky numbers", "numerology"])],
        unless: &[],
        answer: Answer::Text(LUCKY_NUMBER),
    },
    Rule {
        topic: "scientific",
        triggers: &[
            Trigger::Any(&["scientific", "science", "how astrology works"]),
            Trigger::All(&["is astrology", "real"]),
            Trigger::All(&["is astrology", "true"]),
            Trigger::All(&["is astrology", "accurate"]),
        ],
        unless: &[],
        answer: Answer::Text(SCIENTIFIC),
    },
    Rule {
        topic: "career",
        triggers: &[Trigger::Any(&["career", "job", "jobs", "business", "promotion", "profession"])],
        unless: &[],
        answer: Answer::Text(CAREER),
    },
    Rule {
        topic: "marriage",
        triggers: &[Trigger::Any(&["marriage", "married", "love", "relationship", "relationships", "wedding"])],
        unless: &[],
        answer: Answer::Text(MARRIAGE),
    },
    Rule {
        topic: "health",
        triggers: &[Trigger::Any(&["health", "disease", "medical", "illness"])],
        unless: &[],
        answer: Answer::Text(HEALTH),
    },
    Rule {
        topic: "astrology",
        triggers: &[
            Trigger::Any(&["what is astrology", "what s astrology", "astrology meaning", "define astrology"]),
            Trigger::All(&["what", "astrology"]),
        ],
        unless: &[],
        answer: Answer::Text(ASTROLOGY_MEANING),
    },
    Rule {
        topic: "pooja",
        triggers: &[Trigger::Any(&["pooja", "poojas", "puja", "pujas", "ritual", "rituals", "homam", "havan"])],
        unless: &[],
        answer: Answer::Text(POOJA),
    },
    Rule {
        topic: "vastu",
        triggers: &[Trigger::Any(&["vastu", "feng shui"])],
        unless: &[],
        answer: Answer::Text(VASTU),
    },
    Rule {
        topic: "predictions",
        triggers: &[Trigger::Any(&["predict", "prediction", "predictions", "future", "fortune"])],
        unless: &[],
        answer: Answer::Text(PREDICTIONS),
    },
    Rule {
        topic: "muhurat",
        triggers: &[Trigger::Any(&["muhurat", "muhurtham", "muhurta", "auspicious", "lucky"])],
        unless: &[],
        answer: Answer::Text(MUHURAT),
    },
    Rule {
        topic: "children",
        triggers: &[Trigger::Any(&["child", "children", "baby", "pregnancy"])],
        unless: &[],
        answer: Answer::Text(CHILD),
    },
    Rule {
        topic: "wealth",
        triggers: &[Trigger::Any(&["money", "wealth", "finance", "financial"])],
        unless: &[],
        answer: Answer::Text(WEALTH),
    },
    Rule {
        topic: "education",
        triggers: &[Trigger::Any(&["education", "study", "studies", "exam", "exams"])],
        unless: &[],
        answer: Answer::Text(EDUCATION),
    },
    Rule {
        topic: "travel",
        triggers: &[Trigger::Any(&["foreign", "abroad", "travel", "visa"])],
        unless: &[],
        answer: Answer::Text(TRAVEL),
    },
    Rule {
        topic: "legal",
        triggers: &[Trigger::Any(&["legal", "court", "litigation"])],
        unless: &[],
        answer: Answer::Text(LEGAL),
    },
    Rule {
        topic: "naming",
        triggers: &[Trigger::Any(&["name", "names", "naming"])],
        unless: &[],
        answer: Answer::Text(NAMING),
    },
    Rule {
        topic: "information-needed",
        triggers: &[Trigger::Any(&["what information", "what details", "what do i need"])],
        unless: &[],
        answer: Answer::Text(INFORMATION_NEEDED),
    },
    Rule {
        topic: "duration",
        triggers: &[Trigger::Any(&["how long", "duration", "time taken"])],
        unless: &[],
        answer: Answer::Text(DURATION),
    },
    Rule {
        topic: "timing",
        triggers: &[Trigger::Any(&["when", "timing", "time", "dasha"])],
        unless: &[],
        answer: Answer::Text(TIMING),
    },
    Rule {
        topic: "online",
        triggers: &[Trigger::Any(&["online", "video call", "zoom", "skype", "google meet"])],
        unless: &[],
        answer: Answer::Text(ONLINE),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::context::{BusinessInfo, ServiceSummary};

    fn context() -> ChatContext {
        ChatContext {
            business: BusinessInfo {
                business_name: Some("Star & Moon".into()),
                phone: Some("+91 98765 43210".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn topic(message: &str) -> Option<&'static str> {
        match reply(message, &context()) {
            RuleReply::Specific { topic, .. } => Some(topic),
            _ => None,
        }
    }

    #[test]
    fn test_words_match_on_boundaries() {
        let words = Words::new("Is this thing on?");
        assert!(!words.has("hi"));
        assert!(words.has("this"));
        assert!(words.has("thing on"));
        assert!(!words.has(""));
    }

    #[test]
    fn test_commands_match_whole_message() {
        assert_eq!(reply("book", &context()).text(), SHOW_BOOKING_FORM);
        assert_eq!(reply("  FAQ ", &context()).text(), FAQ);
        assert_eq!(topic("hours"), Some("command"));
        assert_ne!(reply("book me", &context()).text(), SHOW_BOOKING_FORM);
    }

    #[test]
    fn test_hours_default_and_escaping() {
        let mut context = context();
        let text = reply("hours", &context).into_text();
        assert!(text.contains("Monday - Saturday: 9:00 AM - 8:00 PM"));

        context.business.business_hours = Some("<b>Always</b>".into());
        let text = reply("hours", &context).into_text();
        assert!(text.contains("&lt;b&gt;Always"));
    }

    #[test]
    fn test_services_command_lists_active_services() {
        let mut context = context();
        context.astrological_services = vec![ServiceSummary {
            title: "Palmistry".into(),
            description: Some("Palm reading".into()),
        }];
        let text = reply("services", &context).into_text();
        assert!(text.contains("Palmistry"));
        assert!(text.contains("Palm reading"));
    }

    #[test]
    fn test_greeting_uses_business_name() {
        let text = reply("Hi there", &context()).into_text();
        assert!(text.contains("Star &amp; Moon"));
    }

    #[test]
    fn test_hi_inside_word_is_not_a_greeting() {
        assert_ne!(topic("this is about my kundali"), Some("greeting"));
        assert_eq!(topic("this is about my kundali"), Some("horoscope"));
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(topic("what is my sun sign"), Some("sun-sign"));
        assert_eq!(topic("I am a Leo"), Some("zodiac"));
        assert_eq!(topic("Do I have mangal dosha?"), Some("mangal-dosha"));
        assert_eq!(topic("what does mars represent"), Some("mars"));
        assert_eq!(topic("is kundali matching needed"), Some("kundali-matching"));
        assert_eq!(topic("how long does a session take"), Some("duration"));
        assert_eq!(topic("when will I get a new job"), Some("career"));
    }

    #[test]
    fn test_pricing_includes_phone() {
        let text = reply("How much does it cost?", &context()).into_text();
        assert!(text.contains("+91 98765 43210"));
    }

    #[test]
    fn test_general_and_default_replies() {
        let general = reply("tell me about the sun", &context());
        assert!(matches!(general, RuleReply::GeneralAstrology(_)));
        assert!(!general.is_specific());

        let default = reply("qwerty", &context());
        assert!(matches!(default, RuleReply::Default(_)));
        assert!(default.text().contains("Here's how I can assist you"));
    }
}
