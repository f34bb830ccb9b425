//! Common regex patterns for DDT/FT extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Document type markers
    pub static ref DDT_FILE_NAME: Regex = Regex::new(
        r"(?:^|[^A-Z])DD[TV](?:[^A-Z]|$)"
    ).unwrap();

    pub static ref FT_FILE_NAME: Regex = Regex::new(
        r"(?:^|[^A-Z])FTV?(?:[^A-Z]|$)"
    ).unwrap();

    pub static ref FT_STRONG_MARKER: Regex = Regex::new(
        r"(?im)^\s*FTV?\s+\d+|FATTURA\s+(?:N[°.]|ACCOMPAGNATORIA|DIFFERITA|IMMEDIATA)|\bFTV\b"
    ).unwrap();

    pub static ref FT_WEAK_MARKER: Regex = Regex::new(
        r"(?i)\bFATTURA\b"
    ).unwrap();

    pub static ref DDT_TEXT_MARKER: Regex = Regex::new(
        r"(?i)D\.D\.T\.|DOCUMENTO\s+DI\s+TRASPORTO|\bDD[TV]\b"
    ).unwrap();

    pub static ref TRANSPORT_MARKER: Regex = Regex::new(
        r"(?i)D\.D\.T\.|DOCUMENTO\s+DI\s+TRASPORTO"
    ).unwrap();
}

lazy_static! {
    // Compact record row: number(4) date(d/mm/yy) page client(5) [name]
    pub static ref COMPACT_ROW_SPACED: Regex = Regex::new(
        r"^(\d{4})\s+(\d{1,2}/\d{2}/\d{2})\s+(\d+)\s+(\d{5})\s+(.+)$"
    ).unwrap();

    pub static ref COMPACT_ROW_JOINED: Regex = Regex::new(
        r"^(\d{4})(\d{1,2}/\d{2}/\d{2})\s*(\d+)\s+(\d{5})\s+(.+)$"
    ).unwrap();

    pub static ref COMPACT_ROW_LOOSE: Regex = Regex::new(
        r"^(\d{4})\s*(\d{1,2}/\d{2}/\d{2})\s*(\d+)\s*(\d{5})\s*(.+)$"
    ).unwrap();

    pub static ref COMPACT_NUMBER: Regex = Regex::new(r"^\d{4}$").unwrap();
    pub static ref COMPACT_DATE: Regex = Regex::new(r"^\d{1,2}/\d{2}/\d{2}$").unwrap();
    pub static ref COMPACT_PAGE: Regex = Regex::new(r"^\d+$").unwrap();
    pub static ref COMPACT_CLIENT_CODE: Regex = Regex::new(r"^\d{5}$").unwrap();

    pub static ref COMPACT_NAME_STOP: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|P\.ZA|PIAZZA|\d{5}|\d{11})"
    ).unwrap();
}

lazy_static! {
    // Document number, delivery notes
    pub static ref COMPACT_NUMBER_LINE: Regex = Regex::new(
        r"(?m)^(\d{4})\s+\d{1,2}/\d{2}/\d{2}\s+\d+\s+\d{5}"
    ).unwrap();

    pub static ref COMPACT_NUMBER_ANYWHERE: Regex = Regex::new(
        r"\b(\d{4})\s+\d{1,2}/\d{2}/\d{2}\s+\d+\s+\d{5}"
    ).unwrap();

    pub static ref COMPACT_NUMBER_LOOSE: Regex = Regex::new(
        r"(?m)^(\d{4})\s*\d{1,2}/\d{2}/\d{2}\s*\d+\s*\d{5}"
    ).unwrap();

    pub static ref CLIENT_DELIVERY_HEADER: Regex = Regex::new(
        r"(?i)Cliente\s+Luogo\s+di\s+consegna"
    ).unwrap();

    pub static ref LEADING_FOUR_DIGITS: Regex = Regex::new(r"^(\d{4})\s+").unwrap();

    pub static ref DDT_DOTTED_NUMBER: Regex = Regex::new(
        r"(?i)D\.D\.T\.?\s*(?:N[°.]?|°)?\s*(\d{4,6})\b"
    ).unwrap();

    pub static ref DDT_NUMBER: Regex = Regex::new(
        r"(?i)\bDD[TV]\s*(?:N[°.]?|°)?\s*(\d{4,6})\b"
    ).unwrap();

    pub static ref TRANSPORT_DOCUMENT_NUMBER: Regex = Regex::new(
        r"(?i)DOCUMENTO\s+DI\s+TRASPORTO\s*(?:N[°.]?|°)?\s*(\d{4,6})\b"
    ).unwrap();

    pub static ref NUMBER_BEFORE_DATE: Regex = Regex::new(
        r"(?m)^(\d{4,6})\s+\d{2}/\d{2}/\d{2}"
    ).unwrap();

    pub static ref NUMBER_SIGN: Regex = Regex::new(
        r"\bN(?:[°.]\s*|\s+)(\d{4,6})(?:\s|/|$)"
    ).unwrap();

    pub static ref NUMERO_LABEL: Regex = Regex::new(
        r"(?i)\bNUMERO\s*:?\s*(\d{4,6})\b"
    ).unwrap();

    pub static ref NUMERO_DEL: Regex = Regex::new(
        r"(?i)\bNumero\s+(\d{4,6})\s+Del\b"
    ).unwrap();

    pub static ref LEADING_NUMBER: Regex = Regex::new(r"^(\d{4,6})(?:\s|$)").unwrap();

    pub static ref FILE_NAME_NUMBERS: Vec<Regex> = vec![
        Regex::new(r"(?i)DD[VT][_\s]+(\d{4,6})").unwrap(),
        Regex::new(r"(?i)(?:^|[^A-Z])FTV?[_\s]+(\d{1,6})").unwrap(),
        Regex::new(r"(?i)[_\s](\d{6})(?:\.pdf)?$").unwrap(),
        Regex::new(r"(?i)(\d{4,6})[_\s]+DD[VT]").unwrap(),
    ];
}

lazy_static! {
    // Document number, invoices
    pub static ref FT_ROW_NUMBER: Regex = Regex::new(
        r"(?m)^FTV?\s+(\d+)\s+\d{1,2}/\d{2}/\d{2}"
    ).unwrap();

    pub static ref FATTURA_NUMBER: Regex = Regex::new(
        r"(?i)\bFATTURA\s*(?:N[°.]?\s*)?(\d+(?:/\d+)?)"
    ).unwrap();

    pub static ref FATTURA_ACCOMPAGNATORIA_NUMBER: Regex = Regex::new(
        r"(?i)FATTURA\s+ACCOMPAGNATORIA\s*(?:N[°.]?\s*)?(\d+(?:/\d+)?)"
    ).unwrap();

    pub static ref FT_NUMBER: Regex = Regex::new(
        r"(?i)\bFTV?\s*(?:N[°.]?|°)?\s*(\d+(?:/\d+)?)"
    ).unwrap();

    pub static ref FT_DOTTED_NUMBER: Regex = Regex::new(
        r"(?i)\bF\.T\.(?:V\.)?\s*(?:N[°.]?|°)?\s*(\d+(?:/\d+)?)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_SIGN: Regex = Regex::new(
        r"(?i)\bN[°.]\s*(\d+(?:/\d+)?)(?:\s|del|$)"
    ).unwrap();

    pub static ref INVOICE_NUMERO_LABEL: Regex = Regex::new(
        r"(?i)\bNUMERO\s*:?\s*(\d+(?:/\d+)?)"
    ).unwrap();

    pub static ref COMMERCIAL_DOCUMENT_NUMBER: Regex = Regex::new(
        r"(?i)DOCUMENTO\s+COMMERCIALE\s*[N°.]*\s*(\d+)"
    ).unwrap();

    pub static ref FT_ROW_LINE: Regex = Regex::new(r"(?i)\bFTV?\s+\d+").unwrap();
}

lazy_static! {
    // Dates
    pub static ref DATE_ANY: Regex = Regex::new(
        r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_AFTER_DEL: Regex = Regex::new(
        r"(?i)\bdel\s+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_AFTER_DATA: Regex = Regex::new(
        r"(?i)\bDATA(?:\s+DOCUMENTO)?[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b"
    ).unwrap();

    pub static ref FT_ROW_DATE: Regex = Regex::new(
        r"(?m)^FTV?\s+\d+\s+(\d{1,2}/\d{2}/\d{2,4})"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre)\s+(\d{4})\b"
    ).unwrap();

    pub static ref DELIVERY_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)DATA\s+(?:DI\s+)?CONSEGNA[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").unwrap(),
        Regex::new(r"(?i)\bCONSEGNA[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").unwrap(),
        Regex::new(r"(?i)DELIVERY\s+DATE[:\s]+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").unwrap(),
        Regex::new(r"(?i)\bCONSEGNA\s+(?:IL\s+)?(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})").unwrap(),
    ];
}

lazy_static! {
    // Client code
    pub static ref CLIENT_CODE_LABEL: Regex = Regex::new(
        r"(?i)\bCOD(?:ICE)?\.?\s*CLIENTE[:\s]*(\d+)"
    ).unwrap();

    pub static ref CLIENT_NUMBER_LABEL: Regex = Regex::new(
        r"(?i)\bCLIENTE\s*N[°.]?\s*(\d+)"
    ).unwrap();

    pub static ref CLIENT_CODE_SHORT: Regex = Regex::new(
        r"(?i)\bCod\.\s*Cli\.\s*(\d{4,5})\b"
    ).unwrap();
}

lazy_static! {
    // VAT number
    pub static ref VAT_LABEL: Regex = Regex::new(
        r"(?i)\bP(?:ARTITA)?\.?\s*I\.?V\.?A\.?[:\s]*(\d{11})\b"
    ).unwrap();

    pub static ref FISCAL_CODE_LABEL: Regex = Regex::new(
        r"(?i)\bC\.?\s*F\.?[:\s]+(\d{11})\b"
    ).unwrap();

    pub static ref ELEVEN_DIGITS: Regex = Regex::new(r"\b(\d{11})\b").unwrap();
}

lazy_static! {
    // Order reference
    pub static ref ORDER_REFERENCE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bRIF(?:ERIMENTO)?\s*\.?\s*ORDINE[:\s]+(?:N[°.]\s*|N\s+)?([A-Z0-9][\w/-]*)").unwrap(),
        Regex::new(r"(?i)\bORDINE\s*N[°.]?\s*(\d[\w/-]*)").unwrap(),
        Regex::new(r"(?i)\bODV[:\s]*([A-Z0-9][\w/-]*)").unwrap(),
        Regex::new(r"(?i)\bVS\s*\.?\s*ORDINE[:\s]+(?:N[°.]\s*|N\s+)?([A-Z0-9][\w/-]*)").unwrap(),
        Regex::new(r"(?i)\bNS\s*\.?\s*ORDINE[:\s]+(?:N[°.]\s*|N\s+)?([A-Z0-9][\w/-]*)").unwrap(),
    ];
}

lazy_static! {
    // Order date on the order reference line
    pub static ref ORDER_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bdel\s+(\d{1,2}[/-]\d{1,2}(?:[/-]\d{1,4})?)\b").unwrap(),
        Regex::new(r"\s(\d{1,2}[/-]\d{1,2}(?:[/-]\d{1,4})?)(?:\s|$)").unwrap(),
        Regex::new(r"(\d{1,2}[/-]\d{1,2}(?:[/-]\d{1,4})?)$").unwrap(),
        Regex::new(r"(?i)\bdata[:\s]+(\d{1,2}[/-]\d{1,2}(?:[/-]\d{1,4})?)").unwrap(),
    ];
}

lazy_static! {
    // Client name
    pub static ref SPETT_MARKER: Regex = Regex::new(
        r"(?i)\b(?:Spett(?:\.le|abile)|Addressed\s+to:?)\s*"
    ).unwrap();

    pub static ref NAME_STOP_LINE: Regex = Regex::new(
        r"(?i)^(?:(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|P\.ZA)(?:\s|$)|P\.?\s*IVA|PARTITA\s+IVA|\d{5}(?:\s|$))"
    ).unwrap();

    pub static ref LUOGO_PREFIX: Regex = Regex::new(
        r"(?i)^Luogo\s*di\s*consegna\s*:?\s*|^Luogo\s*:\s*"
    ).unwrap();

    pub static ref LEGAL_FORM_SUFFIX: Regex = Regex::new(
        r"(?i)(?:S\.R\.L\.?|SRL|S\.P\.A\.?|SPA|S\.N\.C\.?|SNC|S\.A\.S\.?|SAS)\s*$"
    ).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(
        r"(?im)^\s*(?:DESTINATARIO|INTESTATARIO|RAGIONE\s+SOCIALE|CLIENTE)\s*:\s*(.+)$"
    ).unwrap();

    pub static ref LABELED_SECTION_END: Regex = Regex::new(
        r"(?i)Partita\s+IVA|Codice\s+Fiscale|Documento\s+interno"
    ).unwrap();

    pub static ref LABELED_LEFT_SKIP: Regex = Regex::new(
        r"(?i)^(?:Partita\s+IVA|Codice\s+Fiscale|Operatore)"
    ).unwrap();
}

lazy_static! {
    // Line items
    pub static ref ITEM_GIFT: Regex = Regex::new(
        r"^(\w{6,})\s+(.+?)\s+(PZ|KG|LT|CF|CT|BT|SC|GR)\s+(\d+(?:,\d+)?)\s+\*\s+([\d,]+)\s+([\d.,]+)\s+(\d{1,2})\s+(\d{1,2})$"
    ).unwrap();

    pub static ref ITEM_STANDARD: Regex = Regex::new(
        r"^(\w{6,})\s+(.+?)\s+(PZ|KG|LT|CF|CT|BT|SC|GR)\s+(\d+(?:,\d+)?)\s+([\d,]+)\s+([\d.,]+)\s+(\d{1,2})\s+(\d{1,2})$"
    ).unwrap();

    pub static ref ITEM_GENERIC: Regex = Regex::new(
        r"^(\d{6}|[A-Z]{2}\d{6})\s+(.+?)\s+(\d+(?:,\d+)?)\s+(\d+(?:,\d+)?)\s+(\d{1,3}(?:\.\d{3})*,\d{2}|\d+(?:,\d+)?)\b"
    ).unwrap();

    pub static ref WEIGHT_SUFFIX: Regex = Regex::new(
        r"(?i)\s+\d+\s*(?:G|GR|KG|L|ML)$"
    ).unwrap();

    pub static ref ITEM_SKIP: Regex = Regex::new(
        r"(?i)TOTALE|BANCALI|RIFERIMENTO|PRODOTTO\s+NON\s+DISPONIBILE"
    ).unwrap();
}

lazy_static! {
    // Declared totals (Italian amounts: 1.234,56)
    pub static ref SUBTOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(?:IMPONIBILE|TOTALE\s+MERCE)[:\s]*(?:€\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2}|\d+\.\d{2})\b"
    ).unwrap();

    pub static ref VAT_TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\bTOTALE\s+IVA[:\s]*(?:€\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2}|\d+\.\d{2})\b"
    ).unwrap();

    pub static ref VAT_RATE_AMOUNT: Regex = Regex::new(
        r"(?i)\bIVA\s+\d{1,2}\s*%[:\s]*(?:€\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2}|\d+\.\d{2})\b"
    ).unwrap();

    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\bTOTALE\s+(?:DOCUMENTO|FATTURA)[:\s]*(?:€\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2}|\d+\.\d{2})\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_row_variants() {
        let caps = COMPACT_ROW_SPACED.captures("5023 3/06/25 1 20322 DONAC S.R.L.").unwrap();
        assert_eq!(&caps[1], "5023");
        assert_eq!(&caps[2], "3/06/25");
        assert_eq!(&caps[4], "20322");
        assert_eq!(&caps[5], "DONAC S.R.L.");

        let caps = COMPACT_ROW_JOINED.captures("50233/06/25 1 20322 DONAC").unwrap();
        assert_eq!(&caps[2], "3/06/25");

        let caps = COMPACT_ROW_LOOSE.captures("50233/06/25120322DONAC").unwrap();
        assert_eq!(&caps[1], "5023");
        assert_eq!(&caps[3], "1");
        assert_eq!(&caps[4], "20322");
        assert_eq!(&caps[5], "DONAC");
    }

    #[test]
    fn test_name_stop_line() {
        assert!(NAME_STOP_LINE.is_match("VIA ROMA 12"));
        assert!(NAME_STOP_LINE.is_match("P.IVA 01234567890"));
        assert!(NAME_STOP_LINE.is_match("12038 SAVIGLIANO CN"));
        assert!(!NAME_STOP_LINE.is_match("VIANELLO SRL"));
        assert!(!NAME_STOP_LINE.is_match("ROSSI MARIO"));
    }

    #[test]
    fn test_file_name_markers() {
        assert!(DDT_FILE_NAME.is_match("DDV_703723.PDF"));
        assert!(FT_FILE_NAME.is_match("FTV_1.PDF"));
        assert!(!FT_FILE_NAME.is_match("SOFTWARE.PDF"));
    }

    #[test]
    fn test_number_sign_needs_word_start() {
        assert_eq!(&NUMBER_SIGN.captures("DDT N. 5023 del").unwrap()[1], "5023");
        assert!(NUMBER_SIGN.captures("ALFIERIN 12050").is_none());
    }

    #[test]
    fn test_totals_labels() {
        assert_eq!(&SUBTOTAL_LABEL.captures("IMPONIBILE 1.234,56").unwrap()[1], "1.234,56");
        assert_eq!(&VAT_TOTAL_LABEL.captures("TOTALE IVA: 271,60").unwrap()[1], "271,60");
        assert_eq!(&VAT_RATE_AMOUNT.captures("IVA 22% 271,60").unwrap()[1], "271,60");
        assert_eq!(&TOTAL_LABEL.captures("TOTALE DOCUMENTO € 1.506,16").unwrap()[1], "1.506,16");
    }
}
