use crate::expiry::{AnchorPolicy, ExpiryRule};
use crate::models::TaxonNode;
use crate::rules::RuleBook;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// A selectable leaf of the category tree, with its shelf life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductType {
    pub id: u32,
    pub name: String,
    /// Full category path, e.g. `Makeup > Eye > Mascara`.
    pub path: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub months: u32,
    pub anchor: AnchorPolicy,
}

impl ProductType {
    pub fn rule(&self) -> ExpiryRule {
        ExpiryRule::new(self.months, self.anchor)
    }

    pub fn top_category(&self) -> &str {
        self.path.split('>').next().unwrap_or(&self.path).trim()
    }

    /// True when `category` is a prefix of this type's path on segment
    /// boundaries, ignoring case and spacing around `>`.
    pub fn in_category(&self, category: &str) -> bool {
        let wanted: Vec<&str> = segments(category).collect();
        let own: Vec<&str> = segments(&self.path).collect();
        !wanted.is_empty()
            && wanted.len() <= own.len()
            && wanted.iter().zip(&own).all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('>').map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct Catalog {
    types: Vec<ProductType>,
}

impl Catalog {
    pub fn new(mut types: Vec<ProductType>) -> Self {
        types.sort_by(|a, b| a.path.cmp(&b.path));
        Self { types }
    }

    pub fn types(&self) -> &[ProductType] {
        &self.types
    }

    pub fn get(&self, id: &str) -> Option<&ProductType> {
        let id = id.trim().parse::<u32>().ok()?;
        self.types.iter().find(|t| t.id == id)
    }

    /// Lists the direct children of `parent`, or the top level when it is
    /// `None`. An unknown parent has no children.
    pub fn children(&self, parent: Option<&str>) -> Vec<TaxonNode> {
        let depth = parent.map_or(0, |p| segments(p).count());
        let mut nodes: Vec<TaxonNode> = Vec::new();

        for product_type in &self.types {
            if parent.is_some_and(|p| depth == 0 || !product_type.in_category(p)) {
                continue;
            }
            let own: Vec<&str> = segments(&product_type.path).collect();
            let Some(name) = own.get(depth) else {
                continue;
            };
            let path = own[..=depth].join(" > ");
            let is_leaf = own.len() == depth + 1;

            let node = match nodes.iter().position(|n| n.path == path) {
                Some(index) => &mut nodes[index],
                None => {
                    nodes.push(TaxonNode {
                        path,
                        name: name.to_string(),
                        product_type: None,
                        has_children: false,
                    });
                    let last = nodes.len() - 1;
                    &mut nodes[last]
                }
            };
            if is_leaf {
                node.product_type = Some(product_type.id);
            } else {
                node.has_children = true;
            }
        }
        nodes
    }

    pub fn rule_book(&self) -> RuleBook {
        let mut book = RuleBook::new();
        for product_type in &self.types {
            book.insert(product_type.id.to_string(), product_type.rule());
        }
        book
    }

    pub fn builtin() -> Self {
        use AnchorPolicy::{EndOfMonth, PreserveDay};

        let entries: &[(u32, &str, &[&str], u32, AnchorPolicy)] = &[
            (101, "Makeup > Base > Foundation", &["foundation", "ファンデーション"], 12, PreserveDay),
            (102, "Makeup > Base > Concealer", &["concealer", "コンシーラー"], 12, PreserveDay),
            (103, "Makeup > Base > Face Powder", &["powder", "フェイスパウダー"], 24, EndOfMonth),
            (104, "Makeup > Base > Primer", &["primer", "プライマー", "下地"], 12, PreserveDay),
            (111, "Makeup > Eye > Eyeshadow", &["eyeshadow", "eye shadow", "アイシャドウ"], 24, EndOfMonth),
            (112, "Makeup > Eye > Eyeliner", &["eyeliner", "liner", "アイライナー"], 6, PreserveDay),
            (113, "Makeup > Eye > Mascara", &["mascara", "マスカラ"], 3, PreserveDay),
            (114, "Makeup > Eye > Eyebrow", &["brow", "eyebrow", "アイブロウ"], 12, PreserveDay),
            (121, "Makeup > Lip > Lipstick", &["lipstick", "口紅", "リップスティック"], 18, EndOfMonth),
            (122, "Makeup > Lip > Lip Gloss", &["gloss", "リップグロス"], 12, PreserveDay),
            (123, "Makeup > Lip > Lip Tint", &["tint", "リップティント"], 12, PreserveDay),
            (131, "Makeup > Cheek > Powder Blush", &["blush", "チーク"], 24, EndOfMonth),
            (132, "Makeup > Cheek > Cream Blush", &["cream blush", "クリームチーク"], 12, PreserveDay),
            (201, "Skincare > Cleansing > Cleansing Oil", &["cleansing oil", "クレンジングオイル"], 12, PreserveDay),
            (202, "Skincare > Cleansing > Micellar Water", &["micellar", "ミセラーウォーター"], 6, PreserveDay),
            (211, "Skincare > Moisturizing > Toner", &["toner", "lotion", "化粧水", "ローション", "トナー"], 6, PreserveDay),
            (212, "Skincare > Moisturizing > Emulsion", &["emulsion", "milk", "乳液"], 6, PreserveDay),
            (213, "Skincare > Moisturizing > Face Cream", &["cream", "moisturizer", "フェイスクリーム"], 6, PreserveDay),
            (221, "Skincare > Treatment > Serum", &["serum", "essence", "美容液", "セラム"], 6, PreserveDay),
            (231, "Skincare > Mask > Sheet Mask", &["sheet mask", "シートマスク"], 12, EndOfMonth),
            (301, "Haircare > Shampoo > Shampoo", &["shampoo", "シャンプー"], 12, PreserveDay),
            (311, "Haircare > Styling > Hair Oil", &["hair oil", "ヘアオイル"], 12, PreserveDay),
            (401, "Fragrance > Perfume > Eau de Parfum", &["parfum", "perfume", "香水"], 36, EndOfMonth),
            (411, "Fragrance > Body Mist > Body Mist", &["body mist", "mist", "ボディミスト"], 24, EndOfMonth),
        ];

        let types = entries
            .iter()
            .map(|(id, path, keywords, months, anchor)| ProductType {
                id: *id,
                name: path.rsplit('>').next().unwrap_or(*path).trim().to_string(),
                path: path.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                months: *months,
                anchor: *anchor,
            })
            .collect();
        Self::new(types)
    }
}

/// Loads the catalogue file, falling back to the built-in one when the file
/// is missing or unreadable.
pub async fn load_catalog(path: Option<&Path>) -> Catalog {
    let Some(path) = path else {
        return Catalog::builtin();
    };

    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Vec<ProductType>>(&bytes) {
            Ok(types) => {
                info!("loaded {} product types from {}", types.len(), path.display());
                Catalog::new(types)
            }
            Err(err) => {
                error!("failed to parse catalog file: {err}");
                Catalog::builtin()
            }
        },
        Err(err) => {
            error!("failed to read catalog file: {err}");
            Catalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique_and_have_rules() {
        let catalog = Catalog::builtin();
        let book = catalog.rule_book();
        assert_eq!(book.len(), catalog.types().len());
        let mascara = catalog.get("113").expect("mascara");
        assert_eq!(mascara.name, "Mascara");
        assert_eq!(mascara.top_category(), "Makeup");
        assert_eq!(book.get("113"), Some(ExpiryRule::new(3, AnchorPolicy::PreserveDay)));
    }

    #[test]
    fn unknown_ids_are_absent() {
        let catalog = Catalog::builtin();
        assert!(catalog.get("9999").is_none());
        assert!(catalog.get("mascara").is_none());
    }

    #[test]
    fn children_walk_the_tree_level_by_level() {
        let catalog = Catalog::builtin();

        let top: Vec<String> = catalog.children(None).into_iter().map(|n| n.path).collect();
        assert_eq!(top, vec!["Fragrance", "Haircare", "Makeup", "Skincare"]);

        let makeup = catalog.children(Some("makeup"));
        let names: Vec<&str> = makeup.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Base", "Cheek", "Eye", "Lip"]);
        assert!(makeup.iter().all(|n| n.has_children && n.product_type.is_none()));
        assert_eq!(makeup[2].path, "Makeup > Eye");

        let eye = catalog.children(Some("Makeup > Eye"));
        assert_eq!(eye.len(), 4);
        let mascara = eye.iter().find(|n| n.name == "Mascara").expect("mascara");
        assert_eq!(mascara.path, "Makeup > Eye > Mascara");
        assert_eq!(mascara.product_type, Some(113));
        assert!(!mascara.has_children);

        assert!(catalog.children(Some("Makeup > Eye > Mascara")).is_empty());
        assert!(catalog.children(Some("Nails")).is_empty());
        assert!(catalog.children(Some("  ")).is_empty());
    }

    #[test]
    fn category_prefix_respects_segment_boundaries() {
        let catalog = Catalog::builtin();
        let mascara = catalog.get("113").expect("mascara");
        assert!(mascara.in_category("Makeup"));
        assert!(mascara.in_category("MAKEUP>eye"));
        assert!(mascara.in_category("Makeup > Eye > Mascara"));
        assert!(!mascara.in_category("Make"));
        assert!(!mascara.in_category("Makeup > Lip"));
        assert!(!mascara.in_category("Makeup > Eye > Mascara > Waterproof"));
        assert!(!mascara.in_category(""));
    }

    #[tokio::test]
    async fn missing_catalog_file_falls_back() {
        let path = std::env::temp_dir().join("cosme_expiry_missing_catalog.json");
        let catalog = load_catalog(Some(&path)).await;
        assert_eq!(catalog.types().len(), Catalog::builtin().types().len());
    }
}
