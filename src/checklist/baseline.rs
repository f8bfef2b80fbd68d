//! Fixed baseline of always-required submission documents.
//!
//! These eight documents are mandatory in every public tender in this domain
//! regardless of what the individual document says; the synthesizer only has
//! to locate where each one is mentioned. Names and descriptions are kept in
//! the domain language so references resolve against the source text.

/// One always-required entry of the baseline list.
#[derive(Clone, Copy, Debug)]
pub struct BaselineItem {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

/// The versioned baseline list, in presentation order.
pub static BASELINE_ITEMS: [BaselineItem; 8] = [
    BaselineItem {
        name: "Certificado de Cámara de Comercio",
        description: "Certificado de existencia y representación legal (no mayor a 30 días)",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "RUT (Registro Único Tributario)",
        description: "Registro Único Tributario actualizado",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "Certificado de antecedentes fiscales",
        description:
            "Certificado de antecedentes fiscales expedido por Contraloría General de la República",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "Certificado de antecedentes disciplinarios",
        description:
            "Certificado de antecedentes disciplinarios expedido por Procuraduría General de la Nación",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "Certificado de antecedentes judiciales",
        description: "Certificado de antecedentes judiciales de la Policía Nacional",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "Certificado de pago de aportes a seguridad social",
        description: "Certificación de pago de aportes a seguridad social (salud, pensión, ARL)",
        category: "habilitante_juridico",
    },
    BaselineItem {
        name: "Garantía de seriedad de la oferta",
        description: "Póliza o garantía que respalde la seriedad de la oferta",
        category: "garantias",
    },
    BaselineItem {
        name: "Carta de presentación de la propuesta",
        description: "Carta firmada por el representante legal presentando la oferta",
        category: "propuesta",
    },
];
