use chrono::{DateTime, Utc};

use crate::models::{parse_datetime, Article, Category, Locale, Seo};

struct SeedArticle {
    id: &'static str,
    category: &'static str,
    title: &'static str,
    preview: &'static str,
    content: &'static str,
    reading_time: u32,
    publish_date: &'static str,
    author: &'static str,
    tags: &'static [&'static str],
}

const EN_ARTICLES: &[SeedArticle] = &[
    SeedArticle {
        id: "first-steps-after-a-car-accident",
        category: "Treatment",
        title: "First Steps After a Car Accident",
        preview: "Why a medical evaluation within 72 hours matters even when you feel fine.",
        content: "Adrenaline masks pain. Many soft-tissue injuries such as whiplash only \
                  show symptoms days after a collision. A prompt evaluation documents your \
                  condition, rules out hidden injuries and starts treatment before \
                  inflammation sets in. Bring your police report number and insurance \
                  details to the first visit.",
        reading_time: 4,
        publish_date: "2024-01-15",
        author: "Dr. Elena Ruiz",
        tags: &["accident", "evaluation", "whiplash"],
    },
    SeedArticle {
        id: "understanding-pip-coverage",
        category: "Legal",
        title: "Understanding PIP Coverage",
        preview: "Personal Injury Protection pays for care regardless of fault. Here is how it works.",
        content: "Personal Injury Protection (PIP) covers a share of reasonable medical \
                  expenses after an accident no matter who caused it. Most policies require \
                  you to seek initial care within 14 days, so waiting can cost you your \
                  benefits. Our front desk can verify your coverage before your first \
                  appointment.",
        reading_time: 5,
        publish_date: "2024-02-03",
        author: "Clinic Legal Team",
        tags: &["insurance", "pip"],
    },
    SeedArticle {
        id: "physical-therapy-for-whiplash",
        category: "Treatment",
        title: "Physical Therapy for Whiplash",
        preview: "Targeted exercises and manual therapy restore neck mobility safely.",
        content: "Whiplash strains the muscles and ligaments of the neck. A structured \
                  physical therapy plan combines manual therapy, gentle range-of-motion \
                  work and progressive strengthening. Most patients notice improvement \
                  within three to six weeks of consistent sessions.",
        reading_time: 6,
        publish_date: "2024-03-10",
        author: "Carlos Méndez, PT",
        tags: &["whiplash", "physical therapy"],
    },
    SeedArticle {
        id: "documenting-your-injuries",
        category: "Legal",
        title: "Documenting Your Injuries for a Claim",
        preview: "Medical records are the backbone of any injury claim. Keep them complete.",
        content: "Insurers rely on consistent medical documentation. Attend every scheduled \
                  visit, describe all symptoms to your provider, and keep copies of \
                  prescriptions and receipts. Gaps in treatment are the most common reason \
                  claims are reduced.",
        reading_time: 4,
        publish_date: "2024-04-22",
        author: "Clinic Legal Team",
        tags: &["claims", "records"],
    },
    SeedArticle {
        id: "sleep-and-recovery",
        category: "Recovery",
        title: "Sleep and Recovery After an Injury",
        preview: "Quality sleep speeds tissue repair. Small changes make a big difference.",
        content: "Your body repairs damaged tissue during deep sleep. Keep a regular \
                  schedule, support your neck with a medium-height pillow and avoid screens \
                  an hour before bed. Tell your provider if pain wakes you at night so your \
                  plan can be adjusted.",
        reading_time: 3,
        publish_date: "2024-05-18",
        author: "Dr. Elena Ruiz",
        tags: &["sleep", "healing"],
    },
    SeedArticle {
        id: "returning-to-work-safely",
        category: "Recovery",
        title: "Returning to Work Safely",
        preview: "A gradual return plan protects your progress and your paycheck.",
        content: "Going back to full duty too soon is a common cause of setbacks. Ask your \
                  provider for written work restrictions, take short movement breaks every \
                  hour and set up your workstation ergonomically. Most patients return in \
                  stages over two to four weeks.",
        reading_time: 5,
        publish_date: "2024-06-30",
        author: "Carlos Méndez, PT",
        tags: &["work", "ergonomics"],
    },
];

const ES_ARTICLES: &[SeedArticle] = &[
    SeedArticle {
        id: "primeros-pasos-tras-un-accidente",
        category: "Treatment",
        title: "Primeros pasos tras un accidente de auto",
        preview: "Por qué una evaluación médica en las primeras 72 horas es importante aunque se sienta bien.",
        content: "La adrenalina oculta el dolor. Muchas lesiones de tejidos blandos, como el \
                  latigazo cervical, aparecen días después del choque. Una evaluación a \
                  tiempo documenta su condición y empieza el tratamiento antes de la \
                  inflamación. Traiga el número del reporte policial y los datos de su seguro.",
        reading_time: 4,
        publish_date: "2024-01-15",
        author: "Dra. Elena Ruiz",
        tags: &["accidente", "evaluación", "latigazo"],
    },
    SeedArticle {
        id: "entendiendo-la-cobertura-pip",
        category: "Legal",
        title: "Entendiendo la cobertura PIP",
        preview: "La Protección de Lesiones Personales paga su atención sin importar la culpa.",
        content: "La cobertura PIP paga una parte de los gastos médicos razonables después \
                  de un accidente, sin importar quién lo causó. La mayoría de las pólizas \
                  exige recibir atención inicial dentro de 14 días. Nuestro personal puede \
                  verificar su cobertura antes de la primera cita.",
        reading_time: 5,
        publish_date: "2024-02-03",
        author: "Equipo Legal de la Clínica",
        tags: &["seguro", "pip"],
    },
    SeedArticle {
        id: "fisioterapia-para-latigazo-cervical",
        category: "Treatment",
        title: "Fisioterapia para el latigazo cervical",
        preview: "Ejercicios dirigidos y terapia manual devuelven la movilidad del cuello.",
        content: "El latigazo cervical distiende músculos y ligamentos del cuello. Un plan \
                  de fisioterapia combina terapia manual, movilidad suave y fortalecimiento \
                  progresivo. La mayoría de los pacientes mejora entre tres y seis semanas \
                  de sesiones constantes.",
        reading_time: 6,
        publish_date: "2024-03-10",
        author: "Carlos Méndez, PT",
        tags: &["latigazo", "fisioterapia"],
    },
    SeedArticle {
        id: "documentando-sus-lesiones",
        category: "Legal",
        title: "Cómo documentar sus lesiones para un reclamo",
        preview: "Los expedientes médicos son la base de cualquier reclamo. Manténgalos completos.",
        content: "Las aseguradoras dependen de una documentación médica constante. Asista a \
                  cada cita, describa todos sus síntomas y guarde copias de recetas y \
                  recibos. Las interrupciones en el tratamiento son la razón más común por \
                  la que se reducen los reclamos.",
        reading_time: 4,
        publish_date: "2024-04-22",
        author: "Equipo Legal de la Clínica",
        tags: &["reclamos", "expedientes"],
    },
    SeedArticle {
        id: "sueno-y-recuperacion",
        category: "Recovery",
        title: "El sueño y la recuperación después de una lesión",
        preview: "Dormir bien acelera la reparación de tejidos. Pequeños cambios ayudan mucho.",
        content: "El cuerpo repara los tejidos durante el sueño profundo. Mantenga un horario \
                  regular, use una almohada de altura media y evite pantallas una hora antes \
                  de dormir. Avise a su proveedor si el dolor lo despierta por la noche.",
        reading_time: 3,
        publish_date: "2024-05-18",
        author: "Dra. Elena Ruiz",
        tags: &["sueño", "sanación"],
    },
    SeedArticle {
        id: "regreso-seguro-al-trabajo",
        category: "Recovery",
        title: "Regreso seguro al trabajo",
        preview: "Un plan gradual protege su progreso y su salario.",
        content: "Volver a trabajar de lleno demasiado pronto causa recaídas. Pida a su \
                  proveedor restricciones laborales por escrito, tome pausas activas cada \
                  hora y ajuste su estación de trabajo. La mayoría de los pacientes regresa \
                  por etapas en dos a cuatro semanas.",
        reading_time: 5,
        publish_date: "2024-06-30",
        author: "Carlos Méndez, PT",
        tags: &["trabajo", "ergonomía"],
    },
];

impl SeedArticle {
    fn to_article(&self) -> Article {
        Article {
            id: self.id.to_string(),
            category: self.category.to_string(),
            title: self.title.to_string(),
            preview: self.preview.to_string(),
            content: self.content.to_string(),
            reading_time: self.reading_time,
            publish_date: parse_datetime(self.publish_date).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            author: Some(self.author.to_string()),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            seo: Some(Seo {
                title: Some(self.title.to_string()),
                description: Some(self.preview.to_string()),
                keywords: Some(self.tags.join(", ")),
            }),
        }
    }
}

/// The bundled articles for `locale`, in authoring order.
pub fn articles(locale: Locale) -> Vec<Article> {
    let seeds = match locale {
        Locale::En => EN_ARTICLES,
        Locale::Es => ES_ARTICLES,
    };
    seeds.iter().map(SeedArticle::to_article).collect()
}

pub fn find_article(locale: Locale, id: &str) -> Option<Article> {
    let seeds = match locale {
        Locale::En => EN_ARTICLES,
        Locale::Es => ES_ARTICLES,
    };
    seeds
        .iter()
        .find(|seed| seed.id == id)
        .map(SeedArticle::to_article)
}

/// Built-in categories. Keys are shared across locales so a category filter
/// means the same thing in both; only the labels are translated.
pub fn categories(locale: Locale) -> Vec<Category> {
    match locale {
        Locale::En => vec![
            Category::new("all", "All Articles", "#64748b", "📚"),
            Category::new("treatment", "Treatment", "#2563eb", "🩺"),
            Category::new("legal", "Legal", "#7c3aed", "⚖️"),
            Category::new("recovery", "Recovery", "#059669", "💪"),
        ],
        Locale::Es => vec![
            Category::new("all", "Todos los artículos", "#64748b", "📚"),
            Category::new("treatment", "Tratamiento", "#2563eb", "🩺"),
            Category::new("legal", "Legal", "#7c3aed", "⚖️"),
            Category::new("recovery", "Recuperación", "#059669", "💪"),
        ],
    }
}
